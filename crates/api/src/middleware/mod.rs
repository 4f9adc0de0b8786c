//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireReader`] -- Requires the `read` capability (any role).
//! - [`rbac::RequireAuthor`] -- Requires the `write` capability.
//! - [`rbac::RequireAdmin`] -- Requires the `administer` capability.

pub mod auth;
pub mod rbac;
