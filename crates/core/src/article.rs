//! Article validation, tag normalization, content hashing and line diffs.

use crate::error::CoreError;
use crate::hashing::sha256_hex;

/// Maximum title length in bytes.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum body length in bytes.
pub const MAX_BODY_LEN: usize = 100_000;

/// Maximum number of tags per article.
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag in bytes.
pub const MAX_TAG_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate an article title (non-empty, <= 200 chars).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate an article body (non-empty, <= 100 000 chars).
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation("Body must not be empty".into()));
    }
    if body.len() > MAX_BODY_LEN {
        return Err(CoreError::Validation(format!(
            "Body must be at most {MAX_BODY_LEN} characters"
        )));
    }
    Ok(())
}

/// Maximum article group name length in bytes.
pub const MAX_GROUP_NAME_LEN: usize = 100;

/// Trimmed group name, or a validation error when it is blank or too long.
pub fn normalize_group_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Group name must not be empty".into()));
    }
    if name.len() > MAX_GROUP_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Group name must be at most {MAX_GROUP_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Validate and normalize tags: trimmed, lowercased, deduplicated, order kept.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err(CoreError::Validation("Tags must not be empty".into()));
        }
        if tag.len() > MAX_TAG_LEN {
            return Err(CoreError::Validation(format!(
                "Each tag must be at most {MAX_TAG_LEN} characters"
            )));
        }
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    if out.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A maximum of {MAX_TAGS} tags is allowed"
        )));
    }
    Ok(out)
}

/// Text submitted to the embedding provider for an article.
pub fn embedding_text(title: &str, body: &str) -> String {
    format!("{title}\n{body}")
}

/// Hash of the embedded text. An embedding is fresh when its recorded hash
/// equals the article's current one.
pub fn content_hash(title: &str, body: &str) -> String {
    sha256_hex(embedding_text(title, body).as_bytes())
}

// ---------------------------------------------------------------------------
// Simple line-level diff
// ---------------------------------------------------------------------------

/// The type of a line in a diff result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineType {
    Added,
    Removed,
    Unchanged,
}

impl DiffLineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Unchanged => "unchanged",
        }
    }
}

/// A single line in a diff result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
}

/// Compute a line-level diff between two texts using LCS.
pub fn compute_line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let m = old_lines.len();
    let n = new_lines.len();

    let mut lcs = vec![vec![0u32; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            lcs[i][j] = if old_lines[i - 1] == new_lines[j - 1] {
                lcs[i - 1][j - 1] + 1
            } else {
                lcs[i - 1][j].max(lcs[i][j - 1])
            };
        }
    }

    let mut result = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        let (line_type, content) = if i > 0 && j > 0 && old_lines[i - 1] == new_lines[j - 1] {
            i -= 1;
            j -= 1;
            (DiffLineType::Unchanged, old_lines[i])
        } else if j > 0 && (i == 0 || lcs[i][j - 1] >= lcs[i - 1][j]) {
            j -= 1;
            (DiffLineType::Added, new_lines[j])
        } else {
            i -= 1;
            (DiffLineType::Removed, old_lines[i])
        };
        result.push(DiffLine {
            line_type,
            content: content.to_string(),
        });
    }

    result.reverse();
    result
}
