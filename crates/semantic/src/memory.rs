//! In-process implementations used when no remote service is configured,
//! and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use wikisearch_core::embedding::{cosine_similarity, l2_normalize, EmbeddingPurpose};
use wikisearch_core::search::tokenize;
use wikisearch_core::types::DbId;

use crate::error::SemanticError;
use crate::index::{ScoredPoint, VectorIndex};
use crate::provider::EmbeddingProvider;

// ---------------------------------------------------------------------------
// Hashing embedder
// ---------------------------------------------------------------------------

/// Model name recorded for vectors produced by [`HashingEmbedder`].
pub const HASHING_MODEL: &str = "hashing-bow-v1";

/// Deterministic offline embedder: a signed feature-hashed bag of words,
/// L2-normalized. Texts sharing terms get positive cosine similarity.
///
/// Documents and queries are embedded identically.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Synchronous core of [`EmbeddingProvider::embed`].
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            let digest = Sha256::digest(token.as_bytes());
            let mut bucket = [0u8; 8];
            bucket.copy_from_slice(&digest[..8]);
            let slot = (u64::from_le_bytes(bucket) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[slot] += sign;
        }
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn model(&self) -> &str {
        HASHING_MODEL
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(
        &self,
        text: &str,
        _purpose: EmbeddingPurpose,
    ) -> Result<Vec<f32>, SemanticError> {
        Ok(self.embed_text(text))
    }
}

// ---------------------------------------------------------------------------
// Disabled embedder
// ---------------------------------------------------------------------------

/// Provider that always fails: search runs lexical-only and indexing leaves
/// every article `missing`.
#[derive(Debug, Clone)]
pub struct DisabledEmbedder {
    dimension: usize,
}

impl DisabledEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingProvider for DisabledEmbedder {
    fn model(&self) -> &str {
        "disabled"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn embed(
        &self,
        _text: &str,
        _purpose: EmbeddingPurpose,
    ) -> Result<Vec<f32>, SemanticError> {
        Err(SemanticError::ProviderUnavailable(
            "embedding provider is disabled".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// In-memory vector index
// ---------------------------------------------------------------------------

/// Brute-force cosine index held in process memory. Contents are lost on
/// restart; the reconciliation loop repopulates it from the store.
#[derive(Debug)]
pub struct MemoryVectorIndex {
    dimension: usize,
    points: RwLock<HashMap<DbId, Vec<f32>>>,
}

impl MemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            points: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored vectors.
    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    pub async fn contains(&self, article_id: DbId) -> bool {
        self.points.read().await.contains_key(&article_id)
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<(), SemanticError> {
        if vector.len() != self.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn is_persistent(&self) -> bool {
        false
    }

    async fn ensure_ready(&self) -> Result<(), SemanticError> {
        Ok(())
    }

    async fn upsert(&self, article_id: DbId, vector: &[f32]) -> Result<(), SemanticError> {
        self.check_dimension(vector)?;
        self.points.write().await.insert(article_id, vector.to_vec());
        Ok(())
    }

    async fn delete(&self, article_id: DbId) -> Result<(), SemanticError> {
        self.points.write().await.remove(&article_id);
        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredPoint>, SemanticError> {
        self.check_dimension(vector)?;
        let points = self.points.read().await;
        let mut hits: Vec<ScoredPoint> = points
            .iter()
            .map(|(id, v)| ScoredPoint {
                article_id: *id,
                score: cosine_similarity(vector, v),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.article_id.cmp(&b.article_id))
        });
        hits.truncate(k);
        Ok(hits)
    }
}
