//! Lookups against the seeded `roles` table.
//!
//! Users reference roles by row id while the rest of the application speaks
//! [`Role`]; these queries translate between the two.

use sqlx::PgPool;
use wikisearch_core::roles::Role;
use wikisearch_core::types::DbId;

use crate::models::role::RoleRow;

pub struct RoleRepo;

impl RoleRepo {
    /// All seeded roles by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<RoleRow>, sqlx::Error> {
        sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    /// Row id for `role`, or `None` when the seed row is missing.
    pub async fn id_of(pool: &PgPool, role: Role) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(role.as_str())
            .fetch_optional(pool)
            .await
    }

    /// The role stored under `role_id`. A missing row and an unrecognised
    /// name both yield `None`.
    pub async fn role_of(pool: &PgPool, role_id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(pool)
            .await?;
        Ok(name.and_then(|n| n.parse().ok()))
    }
}
