//! Keeps the vector index in step with the article store.
//!
//! Writes call [`Indexer::index_article`] / [`Indexer::remove_article`]
//! after their transaction commits. Both only log failures: the article
//! store is the source of truth and [`Indexer::reconcile`] later re-embeds
//! anything missing or stale and retries pending vector deletions.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use wikisearch_core::article::embedding_text;
use wikisearch_core::embedding::EmbeddingPurpose;
use wikisearch_core::types::DbId;
use wikisearch_db::models::article::Article;
use wikisearch_db::models::embedding::IndexStatusCounts;
use wikisearch_db::repositories::{ArticleRepo, EmbeddingRepo};
use wikisearch_semantic::{EmbeddingProvider, SemanticError, VectorIndex};

use crate::deadline::with_deadline;
use crate::error::PipelineError;

/// Counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Missing or stale articles picked up in this pass.
    pub scanned: usize,
    pub reembedded: usize,
    pub failed: usize,
    pub tombstones_cleared: usize,
}

/// Snapshot for the admin index status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStatus {
    #[serde(flatten)]
    pub counts: IndexStatusCounts,
    pub backend: &'static str,
    pub model: String,
    pub dimension: usize,
    pub provider_enabled: bool,
}

/// Embeds articles and maintains their vectors and bookkeeping rows.
pub struct Indexer {
    pool: PgPool,
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl Indexer {
    pub fn new(
        pool: PgPool,
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        timeout: Duration,
    ) -> Self {
        Self {
            pool,
            provider,
            index,
            timeout,
        }
    }

    /// Create the index collection if needed.
    ///
    /// A non-persistent index starts empty, so existing embedding records
    /// are dropped and reconciliation re-embeds every article.
    pub async fn ensure_ready(&self) -> Result<(), PipelineError> {
        with_deadline(self.timeout, "index setup", self.index.ensure_ready()).await?;
        if !self.index.is_persistent() {
            let cleared = EmbeddingRepo::clear_all(&self.pool).await?;
            if cleared > 0 {
                tracing::info!(
                    cleared,
                    backend = self.index.backend(),
                    "Index is not persistent, embeddings will be rebuilt",
                );
            }
        }
        Ok(())
    }

    /// Embed and store the vector for `article`'s current content.
    ///
    /// Returns `true` on success. Failures are logged and left for
    /// reconciliation.
    pub async fn index_article(&self, article: &Article) -> bool {
        match self.try_index_article(article).await {
            Ok(()) => {
                tracing::debug!(article_id = article.id, "Article indexed");
                true
            }
            Err(e) => {
                tracing::warn!(
                    article_id = article.id,
                    error = %e,
                    "Indexing failed, reconciliation will retry",
                );
                false
            }
        }
    }

    /// Like [`Indexer::index_article`] but returns the error.
    ///
    /// Indexing of one article is serialized through a transaction-scoped
    /// advisory lock. Under the lock the article is re-read, so whichever
    /// call runs last embeds the newest content, even when `article` is an
    /// older snapshot.
    pub async fn try_index_article(&self, article: &Article) -> Result<(), PipelineError> {
        if !self.provider.is_enabled() {
            return Err(SemanticError::ProviderUnavailable(
                "embedding provider is disabled".into(),
            )
            .into());
        }

        let mut tx = self.pool.begin().await?;
        EmbeddingRepo::lock_article(&mut tx, article.id).await?;

        let Some(current) = ArticleRepo::find_by_id(&self.pool, article.id).await? else {
            tx.commit().await?;
            self.remove_article(article.id).await;
            return Ok(());
        };

        let text = embedding_text(&current.title, &current.body);
        let vector = with_deadline(
            self.timeout,
            "embedding",
            self.provider.embed(&text, EmbeddingPurpose::Document),
        )
        .await?;
        let dimension = self.provider.dimension();
        if vector.len() != dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            }
            .into());
        }

        with_deadline(
            self.timeout,
            "vector upsert",
            self.index.upsert(current.id, &vector),
        )
        .await?;

        let recorded = EmbeddingRepo::upsert(
            &mut *tx,
            current.id,
            &current.content_hash,
            self.provider.model(),
            dimension as i32,
        )
        .await?;
        tx.commit().await?;

        if !recorded {
            if ArticleRepo::find_by_id(&self.pool, current.id).await?.is_none() {
                // Deleted while we were embedding: don't leave an orphan vector.
                self.remove_article(current.id).await;
            } else {
                tracing::debug!(
                    article_id = current.id,
                    "Article changed while indexing, left for the next pass",
                );
            }
        }
        Ok(())
    }

    /// Remove the vector of a deleted article. On failure a tombstone is
    /// recorded so reconciliation retries. Returns `true` if removed now.
    pub async fn remove_article(&self, article_id: DbId) -> bool {
        match with_deadline(self.timeout, "vector delete", self.index.delete(article_id)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    article_id,
                    error = %e,
                    "Vector removal failed, recording tombstone",
                );
                if let Err(db_err) = EmbeddingRepo::add_tombstone(&self.pool, article_id).await {
                    tracing::error!(
                        article_id,
                        error = %db_err,
                        "Failed to record index tombstone",
                    );
                }
                false
            }
        }
    }

    /// One repair pass: re-embed up to `batch_size` missing or stale
    /// articles (oldest edit first), then retry up to `batch_size` pending
    /// vector deletions.
    pub async fn reconcile(&self, batch_size: i64) -> Result<ReconcileReport, PipelineError> {
        let mut report = ReconcileReport::default();

        if self.provider.is_enabled() {
            let stale = EmbeddingRepo::find_stale(&self.pool, batch_size).await?;
            report.scanned = stale.len();
            for article in &stale {
                match self.try_index_article(article).await {
                    Ok(()) => report.reembedded += 1,
                    Err(PipelineError::Store(e)) => return Err(PipelineError::Store(e)),
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(
                            article_id = article.id,
                            error = %e,
                            "Re-embedding failed",
                        );
                    }
                }
            }
        }

        for article_id in EmbeddingRepo::list_tombstones(&self.pool, batch_size).await? {
            match with_deadline(self.timeout, "vector delete", self.index.delete(article_id)).await
            {
                Ok(()) => {
                    EmbeddingRepo::clear_tombstone(&self.pool, article_id).await?;
                    report.tombstones_cleared += 1;
                }
                Err(e) => {
                    EmbeddingRepo::record_tombstone_attempt(&self.pool, article_id).await?;
                    tracing::warn!(article_id, error = %e, "Tombstone retry failed");
                }
            }
        }

        if report != ReconcileReport::default() {
            tracing::info!(
                scanned = report.scanned,
                reembedded = report.reembedded,
                failed = report.failed,
                tombstones_cleared = report.tombstones_cleared,
                "Reconciliation pass complete",
            );
        }
        Ok(report)
    }

    pub fn backend(&self) -> &'static str {
        self.index.backend()
    }

    /// Whether writes get embedded. When false, search is lexical only.
    pub fn semantic_enabled(&self) -> bool {
        self.provider.is_enabled()
    }

    /// Freshness counts plus the configured backends.
    pub async fn status(&self) -> Result<IndexStatus, PipelineError> {
        let counts = EmbeddingRepo::status_counts(&self.pool).await?;
        Ok(IndexStatus {
            counts,
            backend: self.backend(),
            model: self.provider.model().to_string(),
            dimension: self.provider.dimension(),
            provider_enabled: self.semantic_enabled(),
        })
    }
}
