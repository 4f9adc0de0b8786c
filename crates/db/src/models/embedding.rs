//! Embedding bookkeeping models.

use serde::Serialize;
use sqlx::FromRow;
use wikisearch_core::types::{DbId, Timestamp};

/// A row from the `embedding_records` table. Records which content hash the
/// vector currently stored in the index was computed from.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmbeddingRecord {
    pub article_id: DbId,
    pub content_hash: String,
    pub model: String,
    pub dimension: i32,
    pub embedded_at: Timestamp,
}

/// Aggregate freshness counts for the admin index status endpoint.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct IndexStatusCounts {
    pub articles: i64,
    pub fresh: i64,
    pub stale: i64,
    pub missing: i64,
    pub tombstones: i64,
}
