//! Article revision model.
//!
//! Revisions are immutable snapshots written on every create, update and
//! restore. Numbers are contiguous per article starting at 1.

use serde::Serialize;
use sqlx::FromRow;
use wikisearch_core::types::{DbId, RevisionNumber, Timestamp};

/// A row from the `article_revisions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Revision {
    pub id: DbId,
    pub article_id: DbId,
    pub revision_number: RevisionNumber,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub author_id: Option<DbId>,
    pub edit_summary: Option<String>,
    pub created_at: Timestamp,
}

/// Revision listing entry without the full body.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevisionSummary {
    pub revision_number: RevisionNumber,
    pub title: String,
    pub author_id: Option<DbId>,
    pub edit_summary: Option<String>,
    pub created_at: Timestamp,
}
