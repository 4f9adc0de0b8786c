//! Article group model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikisearch_core::types::{DbId, Timestamp};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArticleGroup {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// Body of `POST /groups`. Handlers trim and validate before insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroup {
    pub name: String,
    pub description: Option<String>,
}
