//! The embedding provider seam.

use async_trait::async_trait;
use wikisearch_core::embedding::EmbeddingPurpose;

use crate::error::SemanticError;

/// Turns text into a fixed-dimension vector.
///
/// Implementations must be deterministic enough that re-embedding unchanged
/// content yields an equivalent vector, and must return exactly
/// [`dimension`](EmbeddingProvider::dimension) components.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier recorded alongside stored vectors.
    fn model(&self) -> &str;

    /// Number of components in every returned vector.
    fn dimension(&self) -> usize;

    /// `false` for providers that can never succeed, letting callers skip
    /// the round trip and go straight to lexical-only ranking.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Embed `text` for the given purpose.
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose)
        -> Result<Vec<f32>, SemanticError>;
}

impl std::fmt::Debug for dyn EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingProvider")
            .field("model", &self.model())
            .field("dimension", &self.dimension())
            .finish()
    }
}
