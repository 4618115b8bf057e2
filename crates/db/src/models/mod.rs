//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create DTOs for inserts
//! - Update DTOs (all `Option` fields) for patches where the table has one

pub mod follow;
pub mod notification;
pub mod restaurant;
pub mod search_log;
pub mod session;
pub mod share;
pub mod user;
