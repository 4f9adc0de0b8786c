//! Repository for the `articles` table.
//!
//! Every write runs in a transaction that also appends the matching row to
//! `article_revisions`, so an article and its history never disagree.

use sqlx::PgPool;
use wikisearch_core::article::content_hash;
use wikisearch_core::search::build_ilike_patterns;
use wikisearch_core::types::DbId;

use crate::models::article::{Article, CreateArticle, UpdateArticle, UpdateOutcome};
use crate::models::revision::Revision;
use crate::repositories::revision_repo::{NewRevision, RevisionRepo};

/// Column list for articles queries.
const COLUMNS: &str = "id, title, body, tags, owner_id, group_id, content_hash, \
    current_revision, created_at, updated_at";

/// Same columns qualified with the `a` alias, for joins.
pub(crate) const ALIASED_COLUMNS: &str = "a.id, a.title, a.body, a.tags, a.owner_id, \
    a.group_id, a.content_hash, a.current_revision, a.created_at, a.updated_at";

/// Provides CRUD operations for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    /// Create an article together with revision 1.
    pub async fn create(
        pool: &PgPool,
        input: &CreateArticle,
        owner_id: Option<DbId>,
    ) -> Result<Article, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO articles (title, body, tags, owner_id, group_id, content_hash, current_revision)
             VALUES ($1, $2, $3, $4, $5, $6, 1)
             RETURNING {COLUMNS}"
        );
        let article = sqlx::query_as::<_, Article>(&query)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.tags)
            .bind(owner_id)
            .bind(input.group_id)
            .bind(content_hash(&input.title, &input.body))
            .fetch_one(&mut *tx)
            .await?;

        RevisionRepo::insert(
            &mut tx,
            &NewRevision {
                article_id: article.id,
                revision_number: 1,
                title: &article.title,
                body: &article.body,
                tags: &article.tags,
                author_id: owner_id,
                edit_summary: input.edit_summary.as_deref().or(Some("Initial revision")),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(article)
    }

    /// Find an article by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Article>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1");
        sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the current state of the given articles, optionally restricted to
    /// those carrying every tag in `tags`. Missing IDs are silently skipped.
    pub async fn find_many(
        pool: &PgPool,
        ids: &[DbId],
        tags: Option<&[String]>,
    ) -> Result<Vec<Article>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM articles
             WHERE id = ANY($1)
               AND ($2::TEXT[] IS NULL OR tags @> $2)"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(ids)
            .bind(tags)
            .fetch_all(pool)
            .await
    }

    /// List articles, newest first, optionally restricted to a tag and a
    /// group.
    pub async fn list(
        pool: &PgPool,
        tag: Option<&str>,
        group_id: Option<DbId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Article>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM articles
             WHERE ($1::TEXT IS NULL OR $1 = ANY(tags))
               AND ($2::BIGINT IS NULL OR group_id = $2)
             ORDER BY updated_at DESC, id ASC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(tag)
            .bind(group_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count articles matching the same filter as [`ArticleRepo::list`].
    pub async fn count(
        pool: &PgPool,
        tag: Option<&str>,
        group_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM articles
             WHERE ($1::TEXT IS NULL OR $1 = ANY(tags))
               AND ($2::BIGINT IS NULL OR group_id = $2)",
        )
        .bind(tag)
        .bind(group_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Articles whose title or body contains any of the lowercase query
    /// `terms`, strongest matches first.
    ///
    /// Match strength mirrors the lexical score: 2 per term found in the
    /// title plus a saturating `tf / (tf + 1)` per term for body occurrences.
    /// Ranking happens before the limit, so an older title match is never
    /// crowded out by newer passing mentions.
    pub async fn keyword_candidates(
        pool: &PgPool,
        terms: &[String],
        tags: Option<&[String]>,
        limit: i64,
    ) -> Result<Vec<Article>, sqlx::Error> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let patterns = build_ilike_patterns(terms);
        let query = format!(
            "SELECT {ALIASED_COLUMNS} FROM articles a
             CROSS JOIN LATERAL (
                SELECT SUM(
                    CASE WHEN a.title ILIKE q.pattern THEN 2.0 ELSE 0.0 END
                    + occ.tf / (occ.tf + 1.0)
                ) AS strength
                FROM unnest($1::TEXT[], $2::TEXT[]) AS q(pattern, term)
                CROSS JOIN LATERAL (
                    SELECT ((length(lower(a.body)) - length(replace(lower(a.body), q.term, '')))
                            / GREATEST(length(q.term), 1))::NUMERIC AS tf
                ) occ
             ) m
             WHERE (a.title ILIKE ANY($1) OR a.body ILIKE ANY($1))
               AND ($3::TEXT[] IS NULL OR a.tags @> $3)
             ORDER BY m.strength DESC, a.updated_at DESC, a.id ASC
             LIMIT $4"
        );
        sqlx::query_as::<_, Article>(&query)
            .bind(&patterns)
            .bind(terms)
            .bind(tags)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Apply an update and append the next revision.
    ///
    /// The article row is locked for the duration of the transaction, so
    /// concurrent writers are serialized and each one gets its own revision
    /// number. The unique constraint on `(article_id, revision_number)` backs
    /// this up.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateArticle,
        author_id: Option<DbId>,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        if let Some(expected) = input.expected_revision {
            if expected != current.current_revision {
                return Ok(UpdateOutcome::RevisionMismatch {
                    current: current.current_revision,
                });
            }
        }

        let title = input.title.as_deref().unwrap_or(&current.title);
        let body = input.body.as_deref().unwrap_or(&current.body);
        let tags = input.tags.as_ref().unwrap_or(&current.tags);
        let group_id = input.group_id.unwrap_or(current.group_id);
        let next = current.current_revision + 1;

        let query = format!(
            "UPDATE articles SET
                title = $2,
                body = $3,
                tags = $4,
                content_hash = $5,
                current_revision = $6,
                group_id = $7,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let article = sqlx::query_as::<_, Article>(&query)
            .bind(id)
            .bind(title)
            .bind(body)
            .bind(tags)
            .bind(content_hash(title, body))
            .bind(next)
            .bind(group_id)
            .fetch_one(&mut *tx)
            .await?;

        RevisionRepo::insert(
            &mut tx,
            &NewRevision {
                article_id: id,
                revision_number: next,
                title: &article.title,
                body: &article.body,
                tags: &article.tags,
                author_id,
                edit_summary: input.edit_summary.as_deref(),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(UpdateOutcome::Updated(article))
    }

    /// Restore an older revision's content as a new revision.
    pub async fn restore(
        pool: &PgPool,
        id: DbId,
        revision: &Revision,
        author_id: Option<DbId>,
    ) -> Result<UpdateOutcome, sqlx::Error> {
        let input = UpdateArticle {
            title: Some(revision.title.clone()),
            body: Some(revision.body.clone()),
            tags: Some(revision.tags.clone()),
            group_id: None,
            edit_summary: Some(format!("Restored revision {}", revision.revision_number)),
            expected_revision: None,
        };
        Self::update(pool, id, &input, author_id).await
    }

    /// Delete an article and, by cascade, its revisions and embedding record.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
