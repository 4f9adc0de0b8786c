//! The vector index seam.

use async_trait::async_trait;
use wikisearch_core::types::DbId;

use crate::error::SemanticError;

/// A nearest-neighbour hit. `score` is raw cosine similarity in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPoint {
    pub article_id: DbId,
    pub score: f32,
}

/// Stores one vector per article and answers k-nearest-neighbour queries by
/// cosine similarity. Results may be stale with respect to the article store;
/// callers re-check every hit against the store before using it.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Short backend name for logs and the index status endpoint.
    fn backend(&self) -> &'static str;

    /// Whether stored vectors survive a process restart.
    fn is_persistent(&self) -> bool {
        true
    }

    /// Create the underlying collection if it does not exist yet.
    async fn ensure_ready(&self) -> Result<(), SemanticError>;

    /// Insert or replace the vector for `article_id`.
    async fn upsert(&self, article_id: DbId, vector: &[f32]) -> Result<(), SemanticError>;

    /// Remove the vector for `article_id`. Removing an absent id succeeds.
    async fn delete(&self, article_id: DbId) -> Result<(), SemanticError>;

    /// Up to `k` nearest vectors, best first.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPoint>, SemanticError>;
}
