//! The search ranking pipeline.
//!
//! 1. Parse the query into terms (blank or term-less queries are rejected).
//! 2. In parallel: embed the query and ask the vector index for the nearest
//!    articles, and fetch keyword candidates from the article store.
//! 3. Hydrate vector-only hits from the store. Anything deleted since it was
//!    indexed is dropped here, as is anything failing the tag filter.
//! 4. Score every candidate lexically, merge with the normalized semantic
//!    score, order and truncate (see `wikisearch_core::search`).
//!
//! Any semantic failure (provider down, timeout, bad dimension, index error)
//! switches the request to lexical-only ranking and sets `degraded`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use wikisearch_core::article::embedding_text;
use wikisearch_core::embedding::{normalize_cosine, EmbeddingPurpose};
use wikisearch_core::search::{
    build_snippet, lexical_score, query_terms, rank_candidates,
    RankCandidate, SearchSettings, SNIPPET_MAX_CHARS,
};
use wikisearch_core::types::{DbId, Timestamp};
use wikisearch_db::models::article::Article;
use wikisearch_db::repositories::ArticleRepo;
use wikisearch_semantic::{EmbeddingProvider, ScoredPoint, SemanticError, VectorIndex};

use crate::deadline::with_deadline;
use crate::error::PipelineError;

/// A search request as accepted by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    /// A missing query deserializes as empty and is rejected as invalid.
    #[serde(default)]
    pub q: String,
    pub top_k: Option<i64>,
    /// Only return articles carrying every one of these (normalized) tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One ranked article.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub article_id: DbId,
    pub title: String,
    pub snippet: String,
    pub tags: Vec<String>,
    pub score: f32,
    pub lexical_score: f32,
    /// `None` when the article had no semantic hit or the request ran
    /// lexical-only.
    pub semantic_score: Option<f32>,
    pub updated_at: Timestamp,
}

/// Ranked results plus whether the semantic signal was missing.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub degraded: bool,
}

/// Blends lexical and semantic relevance over the article store.
///
/// Holds no mutable state; one instance is shared by all requests.
pub struct SearchPipeline {
    pool: PgPool,
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    settings: SearchSettings,
    semantic_timeout: Duration,
}

impl SearchPipeline {
    pub fn new(
        pool: PgPool,
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        settings: SearchSettings,
        semantic_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            provider,
            index,
            settings,
            semantic_timeout,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Run a search. Returns at most `top_k` results in descending score
    /// order. Fails only on an invalid query or an article store error.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, PipelineError> {
        let terms = query_terms(&request.q)?;
        let top_k = self.settings.resolve_top_k(request.top_k);
        let limit = self.settings.candidate_limit(top_k);
        let tags = (!request.tags.is_empty()).then_some(request.tags.as_slice());

        let (semantic, keyword) = tokio::join!(
            self.nearest(&request.q, EmbeddingPurpose::Query, limit),
            ArticleRepo::keyword_candidates(&self.pool, &terms, tags, limit as i64),
        );
        let keyword = keyword?;

        let outcome = self
            .rank(&terms, top_k, tags, keyword, semantic.as_deref(), None)
            .await?;

        tracing::debug!(
            query = %request.q,
            top_k,
            results = outcome.results.len(),
            degraded = outcome.degraded,
            "Search completed",
        );
        Ok(outcome)
    }

    /// Articles semantically close to `article_id`, excluding itself.
    ///
    /// Falls back to a lexical search on the article's title when the
    /// semantic side is unavailable.
    pub async fn related(
        &self,
        article_id: DbId,
        k: Option<i64>,
    ) -> Result<SearchOutcome, PipelineError> {
        let article = ArticleRepo::find_by_id(&self.pool, article_id)
            .await?
            .ok_or(PipelineError::ArticleNotFound(article_id))?;
        let k = self.settings.resolve_top_k(k);

        let text = embedding_text(&article.title, &article.body);
        if let Some(hits) = self
            .nearest(&text, EmbeddingPurpose::Document, k + 1)
            .await
        {
            let mut outcome = self
                .rank(&[], k, None, Vec::new(), Some(&hits), Some(article_id))
                .await?;
            // Related results are scored on similarity alone.
            for r in &mut outcome.results {
                r.score = r.semantic_score.unwrap_or(0.0);
            }
            return Ok(outcome);
        }

        let terms = match query_terms(&article.title) {
            Ok(terms) => terms,
            Err(_) => {
                return Ok(SearchOutcome {
                    results: Vec::new(),
                    degraded: true,
                })
            }
        };
        let limit = self.settings.candidate_limit(k + 1);
        let keyword =
            ArticleRepo::keyword_candidates(&self.pool, &terms, None, limit as i64).await?;
        self.rank(&terms, k, None, keyword, None, Some(article_id))
            .await
    }

    /// Merge keyword candidates with vector hits and rank them.
    ///
    /// `semantic` is `None` in degraded mode. `exclude` drops one article
    /// (the subject of a related-articles request).
    async fn rank(
        &self,
        terms: &[String],
        top_k: usize,
        tags: Option<&[String]>,
        keyword: Vec<Article>,
        semantic: Option<&[ScoredPoint]>,
        exclude: Option<DbId>,
    ) -> Result<SearchOutcome, PipelineError> {
        let semantic_scores: HashMap<DbId, f32> = semantic
            .unwrap_or_default()
            .iter()
            .map(|p| (p.article_id, normalize_cosine(p.score)))
            .collect();

        let mut articles: HashMap<DbId, Article> =
            keyword.into_iter().map(|a| (a.id, a)).collect();
        let vector_only: Vec<DbId> = semantic_scores
            .keys()
            .filter(|id| !articles.contains_key(id))
            .copied()
            .collect();
        for article in ArticleRepo::find_many(&self.pool, &vector_only, tags).await? {
            articles.insert(article.id, article);
        }
        if let Some(id) = exclude {
            articles.remove(&id);
        }

        let candidates: Vec<RankCandidate> = articles
            .values()
            .map(|a| RankCandidate {
                article_id: a.id,
                updated_at: a.updated_at,
                lexical: lexical_score(terms, &a.title, &a.body),
                semantic: semantic_scores.get(&a.id).copied(),
            })
            .collect();

        let semantic_available = semantic.is_some();
        let ranked = rank_candidates(
            candidates,
            &self.settings.weights,
            semantic_available,
            top_k,
        );

        let results = ranked
            .into_iter()
            .filter_map(|hit| {
                let article = articles.remove(&hit.article_id)?;
                Some(SearchResult {
                    article_id: hit.article_id,
                    snippet: build_snippet(&article.body, terms, SNIPPET_MAX_CHARS),
                    title: article.title,
                    tags: article.tags,
                    score: hit.score,
                    lexical_score: hit.lexical_score,
                    semantic_score: hit.semantic_score,
                    updated_at: article.updated_at,
                })
            })
            .collect();

        Ok(SearchOutcome {
            results,
            degraded: !semantic_available,
        })
    }

    /// Embed `text` and query the vector index. `None` means the semantic
    /// signal is unavailable for this request.
    async fn nearest(
        &self,
        text: &str,
        purpose: EmbeddingPurpose,
        k: usize,
    ) -> Option<Vec<ScoredPoint>> {
        if !self.provider.is_enabled() {
            return None;
        }
        match self.try_nearest(text, purpose, k).await {
            Ok(hits) => Some(dedup_hits(hits)),
            Err(e) => {
                tracing::warn!(error = %e, "Semantic search unavailable, ranking lexically");
                None
            }
        }
    }

    async fn try_nearest(
        &self,
        text: &str,
        purpose: EmbeddingPurpose,
        k: usize,
    ) -> Result<Vec<ScoredPoint>, SemanticError> {
        let vector = with_deadline(
            self.semantic_timeout,
            "embedding",
            self.provider.embed(text, purpose),
        )
        .await?;
        let expected = self.provider.dimension();
        if vector.len() != expected {
            return Err(SemanticError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        with_deadline(self.semantic_timeout, "vector query", self.index.query(&vector, k)).await
    }
}

/// Keep the best score per article in case an index returns duplicates.
fn dedup_hits(hits: Vec<ScoredPoint>) -> Vec<ScoredPoint> {
    let mut seen = HashSet::new();
    let mut sorted = hits;
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted.retain(|p| seen.insert(p.article_id));
    sorted
}
