//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Check whether a role name is one the platform knows about.
pub fn is_valid_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_USER
}
