//! Refresh-token sessions.

use serde::Serialize;
use sqlx::FromRow;
use wikisearch_core::types::{DbId, Timestamp};

/// A row from `refresh_sessions`. The token itself is never stored.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub user_agent: Option<String>,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A session to open for a freshly minted refresh token.
pub struct NewSession<'a> {
    pub user_id: DbId,
    /// SHA-256 hex digest of the refresh token.
    pub token_hash: &'a str,
    pub user_agent: Option<&'a str>,
    pub expires_at: Timestamp,
}
