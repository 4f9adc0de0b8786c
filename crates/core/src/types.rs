//! Primitive aliases shared by every crate.

/// Primary keys of `articles`, `users`, `article_groups`; all BIGSERIAL.
pub type DbId = i64;

/// 1-based position of a revision in an article's history. Numbers are
/// assigned without gaps and never reused.
pub type RevisionNumber = i32;

/// Stored as TIMESTAMPTZ, always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
