//! Errors from embedding providers and vector indexes.

/// Failure talking to a semantic collaborator. Callers treat every variant
/// as "semantic signal unavailable" and fall back to lexical ranking.
#[derive(Debug, thiserror::Error)]
pub enum SemanticError {
    /// The HTTP request itself failed (network, DNS, TLS, client timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A Qdrant call failed: transport, timeout or a server-side error.
    #[error("Qdrant request failed: {0}")]
    Qdrant(#[from] qdrant_client::QdrantError),

    /// The remote service returned a non-2xx status code.
    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The remote service answered 2xx with a body we could not use.
    #[error("Unexpected {service} response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    /// No embedding provider is configured.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A vector had the wrong number of components.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The call did not complete within the caller's deadline.
    #[error("{operation} timed out after {after_ms} ms")]
    Timeout {
        operation: &'static str,
        after_ms: u64,
    },

    /// The article id cannot be used as a vector point id.
    #[error("Invalid point id {0}")]
    InvalidPointId(i64),
}
