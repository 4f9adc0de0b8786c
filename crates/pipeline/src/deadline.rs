use std::future::Future;
use std::time::Duration;

use wikisearch_semantic::SemanticError;

/// Run a semantic call under `limit`, turning an elapsed deadline into
/// [`SemanticError::Timeout`].
pub(crate) async fn with_deadline<T, F>(
    limit: Duration,
    operation: &'static str,
    fut: F,
) -> Result<T, SemanticError>
where
    F: Future<Output = Result<T, SemanticError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SemanticError::Timeout {
            operation,
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
