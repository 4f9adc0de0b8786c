//! Article model and write DTOs.

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use wikisearch_core::types::{DbId, RevisionNumber, Timestamp};

/// A row from the `articles` table: the current state of an article.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
    pub owner_id: Option<DbId>,
    pub group_id: Option<DbId>,
    #[serde(skip_serializing)]
    pub content_hash: String,
    pub current_revision: RevisionNumber,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an article. Handlers normalize tags before insert.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub group_id: Option<DbId>,
    pub edit_summary: Option<String>,
}

/// DTO for updating an article. `None` keeps the current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub body: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Absent keeps the current group, `null` removes the article from it.
    #[serde(default, deserialize_with = "present")]
    pub group_id: Option<Option<DbId>>,
    pub edit_summary: Option<String>,
    /// Optimistic concurrency guard: reject the write unless the article is
    /// still at this revision.
    pub expected_revision: Option<RevisionNumber>,
}

/// Wraps any present value, `null` included, in `Some`. Paired with
/// `#[serde(default)]` so an absent field stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Result of a guarded article update.
#[derive(Debug)]
pub enum UpdateOutcome {
    Updated(Article),
    NotFound,
    /// `expected_revision` did not match; carries the actual current revision.
    RevisionMismatch { current: RevisionNumber },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_distinguishes_absent_from_null() {
        let absent: UpdateArticle = serde_json::from_str(r#"{"body": "b"}"#).unwrap();
        assert_eq!(absent.group_id, None);

        let cleared: UpdateArticle = serde_json::from_str(r#"{"group_id": null}"#).unwrap();
        assert_eq!(cleared.group_id, Some(None));

        let moved: UpdateArticle = serde_json::from_str(r#"{"group_id": 7}"#).unwrap();
        assert_eq!(moved.group_id, Some(Some(7)));
    }
}
