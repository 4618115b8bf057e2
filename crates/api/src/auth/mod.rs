//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and credential validation.
//! - [`jwt`] -- JWT access tokens and refresh-token helpers.

pub mod jwt;
pub mod password;
