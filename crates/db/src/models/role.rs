//! Rows of the seeded `roles` lookup table.

use sqlx::FromRow;
use wikisearch_core::roles::Role;
use wikisearch_core::types::DbId;

/// A seeded role. `name` is one of the [`Role`] names.
#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: DbId,
    pub name: String,
}

impl RoleRow {
    /// The typed role, or `None` for a name this build does not know.
    pub fn role(&self) -> Option<Role> {
        self.name.parse().ok()
    }
}
