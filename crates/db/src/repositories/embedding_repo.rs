//! Repository for `embedding_records` and `index_tombstones`.
//!
//! These tables are the bookkeeping side of the vector index: which
//! content hash each stored vector was computed from, and which deleted
//! articles still need their vector removed.

use sqlx::{PgConnection, PgExecutor, PgPool};
use wikisearch_core::types::DbId;

use crate::models::article::Article;
use crate::models::embedding::{EmbeddingRecord, IndexStatusCounts};
use crate::repositories::article_repo::ALIASED_COLUMNS;

/// Column list for embedding_records queries.
const COLUMNS: &str = "article_id, content_hash, model, dimension, embedded_at";

/// Provides bookkeeping operations for the vector index.
pub struct EmbeddingRepo;

impl EmbeddingRepo {
    /// Take the per-article indexing lock for the rest of the caller's
    /// transaction. Concurrent indexers of the same article queue here, so
    /// the vector written last always belongs to the last recorded hash.
    pub async fn lock_article(conn: &mut PgConnection, article_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(article_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Record that the index now holds a vector for `content_hash`.
    ///
    /// Returns `false` when the article no longer exists or its content has
    /// moved past `content_hash`; nothing is written in that case and
    /// reconciliation will treat the article as missing or stale.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        article_id: DbId,
        content_hash: &str,
        model: &str,
        dimension: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO embedding_records (article_id, content_hash, model, dimension)
             SELECT $1, $2, $3, $4
             WHERE EXISTS (SELECT 1 FROM articles WHERE id = $1 AND content_hash = $2)
             ON CONFLICT (article_id) DO UPDATE SET
                content_hash = EXCLUDED.content_hash,
                model = EXCLUDED.model,
                dimension = EXCLUDED.dimension,
                embedded_at = NOW()",
        )
        .bind(article_id)
        .bind(content_hash)
        .bind(model)
        .bind(dimension)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find the embedding record for an article.
    pub async fn find(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<Option<EmbeddingRecord>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM embedding_records WHERE article_id = $1");
        sqlx::query_as::<_, EmbeddingRecord>(&query)
            .bind(article_id)
            .fetch_optional(pool)
            .await
    }

    /// Articles whose vector is missing or was computed from older content,
    /// oldest edit first.
    pub async fn find_stale(pool: &PgPool, limit: i64) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!(
            "SELECT {ALIASED_COLUMNS} FROM articles a
             LEFT JOIN embedding_records e ON e.article_id = a.id
             WHERE e.article_id IS NULL OR e.content_hash <> a.content_hash
             ORDER BY a.updated_at ASC, a.id ASC
             LIMIT $1"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Forget every embedding record, marking all articles as missing.
    pub async fn clear_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM embedding_records")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Freshness counts across all articles plus pending tombstones.
    pub async fn status_counts(pool: &PgPool) -> Result<IndexStatusCounts, sqlx::Error> {
        sqlx::query_as::<_, IndexStatusCounts>(
            "SELECT
                COUNT(a.id) AS articles,
                COUNT(e.article_id) FILTER (WHERE e.content_hash = a.content_hash) AS fresh,
                COUNT(e.article_id) FILTER (WHERE e.content_hash <> a.content_hash) AS stale,
                COUNT(a.id) FILTER (WHERE e.article_id IS NULL) AS missing,
                (SELECT COUNT(*) FROM index_tombstones) AS tombstones
             FROM articles a
             LEFT JOIN embedding_records e ON e.article_id = a.id",
        )
        .fetch_one(pool)
        .await
    }

    /// Remember that `article_id`'s vector still has to be removed.
    pub async fn add_tombstone(pool: &PgPool, article_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO index_tombstones (article_id) VALUES ($1)
             ON CONFLICT (article_id) DO NOTHING",
        )
        .bind(article_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Pending tombstones, oldest first.
    pub async fn list_tombstones(pool: &PgPool, limit: i64) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT article_id FROM index_tombstones ORDER BY created_at ASC, article_id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Bump the attempt counter after a failed removal.
    pub async fn record_tombstone_attempt(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE index_tombstones SET attempts = attempts + 1 WHERE article_id = $1")
            .bind(article_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Drop a tombstone once the vector is gone. Returns `true` if removed.
    pub async fn clear_tombstone(pool: &PgPool, article_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM index_tombstones WHERE article_id = $1")
            .bind(article_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
