use wikisearch_core::error::CoreError;
use wikisearch_core::types::DbId;
use wikisearch_semantic::SemanticError;

/// Errors from the search pipeline and the indexer.
///
/// Semantic failures never reach search callers (search degrades instead);
/// the `Semantic` variant is only returned by explicit indexing calls.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Article {0} not found")]
    ArticleNotFound(DbId),

    #[error(transparent)]
    Semantic(#[from] SemanticError),

    #[error("Article store error: {0}")]
    Store(#[from] sqlx::Error),

    /// Any other domain error, passed through unchanged.
    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidQuery(msg) => Self::InvalidQuery(msg),
            other => Self::Core(other),
        }
    }
}
