//! Repository for the `article_groups` table.

use sqlx::PgPool;
use wikisearch_core::types::DbId;

use crate::models::group::{ArticleGroup, CreateGroup};

const COLUMNS: &str = "id, name, description, created_by, created_at";

pub struct GroupRepo;

impl GroupRepo {
    /// A name already taken in any case trips `uq_article_groups_name`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGroup,
        created_by: Option<DbId>,
    ) -> Result<ArticleGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO article_groups (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArticleGroup>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// All groups, alphabetical.
    pub async fn list(pool: &PgPool) -> Result<Vec<ArticleGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM article_groups ORDER BY lower(name), id");
        sqlx::query_as::<_, ArticleGroup>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM article_groups WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
