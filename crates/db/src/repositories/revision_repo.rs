//! Repository for the `article_revisions` table.
//!
//! Revisions are only ever inserted from inside an article write
//! transaction (see `ArticleRepo`); this module exposes the reads.

use sqlx::{PgConnection, PgPool};
use wikisearch_core::types::{DbId, RevisionNumber};

use crate::models::revision::{Revision, RevisionSummary};

/// Column list for article_revisions queries.
const COLUMNS: &str = "id, article_id, revision_number, title, body, tags, \
    author_id, edit_summary, created_at";

/// Borrowed fields of a revision about to be written.
pub(crate) struct NewRevision<'a> {
    pub article_id: DbId,
    pub revision_number: RevisionNumber,
    pub title: &'a str,
    pub body: &'a str,
    pub tags: &'a [String],
    pub author_id: Option<DbId>,
    pub edit_summary: Option<&'a str>,
}

/// Provides read and append operations for article revisions.
pub struct RevisionRepo;

impl RevisionRepo {
    /// Append a revision on the caller's transaction connection.
    pub(crate) async fn insert(
        conn: &mut PgConnection,
        rev: &NewRevision<'_>,
    ) -> Result<Revision, sqlx::Error> {
        let query = format!(
            "INSERT INTO article_revisions
                (article_id, revision_number, title, body, tags, author_id, edit_summary)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(rev.article_id)
            .bind(rev.revision_number)
            .bind(rev.title)
            .bind(rev.body)
            .bind(rev.tags)
            .bind(rev.author_id)
            .bind(rev.edit_summary)
            .fetch_one(conn)
            .await
    }

    /// List revision summaries for an article, newest first.
    pub async fn list_by_article(
        pool: &PgPool,
        article_id: DbId,
    ) -> Result<Vec<RevisionSummary>, sqlx::Error> {
        sqlx::query_as::<_, RevisionSummary>(
            "SELECT revision_number, title, author_id, edit_summary, created_at
             FROM article_revisions
             WHERE article_id = $1
             ORDER BY revision_number DESC",
        )
        .bind(article_id)
        .fetch_all(pool)
        .await
    }

    /// Find a specific revision of an article.
    pub async fn find_by_article_and_number(
        pool: &PgPool,
        article_id: DbId,
        revision_number: RevisionNumber,
    ) -> Result<Option<Revision>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM article_revisions
             WHERE article_id = $1 AND revision_number = $2"
        );
        sqlx::query_as::<_, Revision>(&query)
            .bind(article_id)
            .bind(revision_number)
            .fetch_optional(pool)
            .await
    }
}
