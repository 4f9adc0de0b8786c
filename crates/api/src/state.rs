use std::sync::Arc;

use wikisearch_pipeline::{Indexer, SearchPipeline};
use wikisearch_semantic::{EmbeddingProvider, VectorIndex};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wikisearch_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub pipeline: Arc<SearchPipeline>,
    pub indexer: Arc<Indexer>,
}

impl AppState {
    /// Wire the search pipeline and indexer around one provider and index.
    pub fn new(
        pool: wikisearch_db::DbPool,
        config: ServerConfig,
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        let pipeline = SearchPipeline::new(
            pool.clone(),
            Arc::clone(&provider),
            Arc::clone(&index),
            config.search.clone(),
            config.semantic_timeout,
        );
        let indexer = Indexer::new(pool.clone(), provider, index, config.semantic_timeout);

        Self {
            pool,
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            indexer: Arc::new(indexer),
        }
    }
}
