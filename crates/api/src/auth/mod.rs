//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing, verification and strength checks.
//! - [`jwt`] -- JWT access tokens and opaque refresh-token helpers.

pub mod jwt;
pub mod password;
