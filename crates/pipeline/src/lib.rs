//! Search ranking pipeline and vector index maintenance.
//!
//! [`SearchPipeline`] blends keyword relevance from the article store with
//! semantic similarity from the vector index, degrading to keyword-only
//! ranking whenever the semantic side fails. [`Indexer`] keeps the vector
//! index in step with article writes and repairs drift in the background.

mod deadline;
pub mod error;
pub mod indexer;
pub mod search;

pub use error::PipelineError;
pub use indexer::{IndexStatus, Indexer, ReconcileReport};
pub use search::{SearchOutcome, SearchPipeline, SearchRequest, SearchResult};
