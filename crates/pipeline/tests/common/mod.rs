//! Shared fixtures for pipeline integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use wikisearch_core::embedding::EmbeddingPurpose;
use wikisearch_core::search::SearchSettings;
use wikisearch_core::types::DbId;
use wikisearch_db::models::article::{Article, CreateArticle};
use wikisearch_db::repositories::ArticleRepo;
use wikisearch_pipeline::{Indexer, SearchPipeline};
use wikisearch_semantic::{
    DisabledEmbedder, EmbeddingProvider, HashingEmbedder, MemoryVectorIndex, ScoredPoint,
    SemanticError, VectorIndex,
};

pub const DIM: usize = 64;
pub const TIMEOUT: Duration = Duration::from_millis(200);

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Provider whose remote end always answers with an error status.
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn model(&self) -> &str {
        "failing"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, _: &str, _: EmbeddingPurpose) -> Result<Vec<f32>, SemanticError> {
        Err(SemanticError::Api {
            service: "fake",
            status: 429,
            body: "quota exceeded".into(),
        })
    }
}

/// Provider that never answers within [`TIMEOUT`].
pub struct SlowEmbedder;

#[async_trait]
impl EmbeddingProvider for SlowEmbedder {
    fn model(&self) -> &str {
        "slow"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, _: &str, _: EmbeddingPurpose) -> Result<Vec<f32>, SemanticError> {
        tokio::time::sleep(TIMEOUT * 10).await;
        Ok(vec![0.0; DIM])
    }
}

/// Provider returning vectors of the wrong size.
pub struct ShortEmbedder;

#[async_trait]
impl EmbeddingProvider for ShortEmbedder {
    fn model(&self) -> &str {
        "short"
    }

    fn dimension(&self) -> usize {
        DIM
    }

    async fn embed(&self, _: &str, _: EmbeddingPurpose) -> Result<Vec<f32>, SemanticError> {
        Ok(vec![0.5; DIM / 2])
    }
}

/// Index that is unreachable for every operation.
pub struct DownIndex;

#[async_trait]
impl VectorIndex for DownIndex {
    fn backend(&self) -> &'static str {
        "down"
    }

    async fn ensure_ready(&self) -> Result<(), SemanticError> {
        Err(down())
    }

    async fn upsert(&self, _: DbId, _: &[f32]) -> Result<(), SemanticError> {
        Err(down())
    }

    async fn delete(&self, _: DbId) -> Result<(), SemanticError> {
        Err(down())
    }

    async fn query(&self, _: &[f32], _: usize) -> Result<Vec<ScoredPoint>, SemanticError> {
        Err(down())
    }
}

fn down() -> SemanticError {
    SemanticError::Api {
        service: "fake",
        status: 503,
        body: "unavailable".into(),
    }
}

/// Index answering every query with a fixed hit list (raw cosine scores).
pub struct StubIndex(pub Vec<ScoredPoint>);

#[async_trait]
impl VectorIndex for StubIndex {
    fn backend(&self) -> &'static str {
        "stub"
    }

    async fn ensure_ready(&self) -> Result<(), SemanticError> {
        Ok(())
    }

    async fn upsert(&self, _: DbId, _: &[f32]) -> Result<(), SemanticError> {
        Ok(())
    }

    async fn delete(&self, _: DbId) -> Result<(), SemanticError> {
        Ok(())
    }

    async fn query(&self, _: &[f32], k: usize) -> Result<Vec<ScoredPoint>, SemanticError> {
        Ok(self.0.iter().take(k).copied().collect())
    }
}

/// In-memory index whose first upsert is applied at once but acknowledged
/// only after `lag`.
pub struct LaggyIndex {
    pub inner: MemoryVectorIndex,
    lag: Duration,
    lagged: AtomicBool,
}

impl LaggyIndex {
    pub fn new(lag: Duration) -> Self {
        Self {
            inner: MemoryVectorIndex::new(DIM),
            lag,
            lagged: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl VectorIndex for LaggyIndex {
    fn backend(&self) -> &'static str {
        "laggy"
    }

    async fn ensure_ready(&self) -> Result<(), SemanticError> {
        Ok(())
    }

    async fn upsert(&self, article_id: DbId, vector: &[f32]) -> Result<(), SemanticError> {
        self.inner.upsert(article_id, vector).await?;
        if !self.lagged.swap(true, Ordering::SeqCst) {
            tokio::time::sleep(self.lag).await;
        }
        Ok(())
    }

    async fn delete(&self, article_id: DbId) -> Result<(), SemanticError> {
        self.inner.delete(article_id).await
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPoint>, SemanticError> {
        self.inner.query(vector, k).await
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn hashing() -> Arc<dyn EmbeddingProvider> {
    Arc::new(HashingEmbedder::new(DIM))
}

pub fn disabled() -> Arc<dyn EmbeddingProvider> {
    Arc::new(DisabledEmbedder::new(DIM))
}

pub fn memory_index() -> Arc<MemoryVectorIndex> {
    Arc::new(MemoryVectorIndex::new(DIM))
}

pub fn pipeline(
    pool: &PgPool,
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
) -> SearchPipeline {
    SearchPipeline::new(
        pool.clone(),
        provider,
        index,
        SearchSettings::default(),
        TIMEOUT,
    )
}

pub fn indexer(
    pool: &PgPool,
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
) -> Indexer {
    Indexer::new(pool.clone(), provider, index, TIMEOUT)
}

pub async fn create_article(pool: &PgPool, title: &str, body: &str, tags: &[&str]) -> Article {
    let input = CreateArticle {
        title: title.to_string(),
        body: body.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        group_id: None,
        edit_summary: None,
    };
    ArticleRepo::create(pool, &input, None).await.unwrap()
}
