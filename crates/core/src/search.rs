//! Search ranking primitives: tokenization, lexical scoring, score merging,
//! snippets and limit clamping.
//!
//! This module is pure: the pipeline crate gathers candidates from the store
//! and the vector index, then hands them to [`rank_candidates`].
//!
//! # Scoring model
//!
//! * **Lexical** (`[0, 1]`): for every unique query term, `TITLE_TERM_WEIGHT`
//!   when the term is a title token plus `BODY_TERM_WEIGHT * tf / (tf + 1)`
//!   for its body frequency `tf`; the sum is divided by
//!   `|terms| * (TITLE_TERM_WEIGHT + BODY_TERM_WEIGHT)`.
//! * **Semantic** (`[0, 1]`): normalized cosine similarity reported by the
//!   vector index, `0` when the article had no hit.
//! * **Combined**: `w_sem * semantic + w_lex * lexical`, weights summing to 1.
//!   When semantic retrieval was unavailable the combined score is the
//!   lexical score alone.
//!
//! Ties are broken by the newest revision timestamp, then ascending id.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default number of search results.
pub const DEFAULT_TOP_K: i64 = 10;

/// Maximum number of search results.
pub const MAX_TOP_K: i64 = 50;

/// How many candidates each retriever fetches per requested result.
pub const DEFAULT_OVERSAMPLE_FACTOR: usize = 3;

/// Default weight of the semantic signal in the combined score.
pub const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.6;

/// Default weight of the lexical signal in the combined score.
pub const DEFAULT_LEXICAL_WEIGHT: f32 = 0.4;

/// Lexical credit for a query term found in the title.
pub const TITLE_TERM_WEIGHT: f32 = 2.0;

/// Maximum lexical credit for a query term found in the body.
pub const BODY_TERM_WEIGHT: f32 = 1.0;

/// Maximum snippet length in characters (excluding ellipses).
pub const SNIPPET_MAX_CHARS: usize = 160;

/// Characters of context kept before the first matching term.
const SNIPPET_LEAD_CHARS: usize = 40;

/// Default page size for article listings.
pub const DEFAULT_LIST_LIMIT: i64 = 20;

/// Maximum page size for article listings.
pub const MAX_LIST_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Relative weights of the two ranking signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl RankWeights {
    /// Build weights, normalizing them to sum to 1.
    ///
    /// Rejects negative or non-finite weights and an all-zero pair.
    pub fn new(semantic: f32, lexical: f32) -> Result<Self, CoreError> {
        if !semantic.is_finite() || !lexical.is_finite() || semantic < 0.0 || lexical < 0.0 {
            return Err(CoreError::Validation(
                "Rank weights must be finite and non-negative".into(),
            ));
        }
        let total = semantic + lexical;
        if total <= 0.0 {
            return Err(CoreError::Validation(
                "At least one rank weight must be positive".into(),
            ));
        }
        Ok(Self {
            semantic: semantic / total,
            lexical: lexical / total,
        })
    }

    /// Combine the two signals. `semantic` is `None` in degraded mode.
    pub fn combine(&self, lexical: f32, semantic: Option<f32>) -> f32 {
        match semantic {
            Some(s) => self.semantic * s + self.lexical * lexical,
            None => lexical,
        }
    }
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            semantic: DEFAULT_SEMANTIC_WEIGHT,
            lexical: DEFAULT_LEXICAL_WEIGHT,
        }
    }
}

/// Tunables of the search ranking pipeline.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub weights: RankWeights,
    pub oversample_factor: usize,
    pub default_top_k: i64,
    pub max_top_k: i64,
}

impl SearchSettings {
    /// Clamp a requested `top_k` to the configured bounds.
    pub fn resolve_top_k(&self, requested: Option<i64>) -> usize {
        clamp_limit(requested, self.default_top_k, self.max_top_k) as usize
    }

    /// Number of candidates each retriever should fetch for `top_k` results.
    pub fn candidate_limit(&self, top_k: usize) -> usize {
        top_k.saturating_mul(self.oversample_factor.max(1))
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            weights: RankWeights::default(),
            oversample_factor: DEFAULT_OVERSAMPLE_FACTOR,
            default_top_k: DEFAULT_TOP_K,
            max_top_k: MAX_TOP_K,
        }
    }
}

// ---------------------------------------------------------------------------
// Tokenization
// ---------------------------------------------------------------------------

fn is_term_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Split text into lowercase terms on every non-alphanumeric character
/// (underscores are kept inside terms).
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !is_term_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Unique query terms in order of first appearance.
///
/// Returns [`CoreError::InvalidQuery`] when the query is blank or contains
/// no usable terms.
pub fn query_terms(query: &str) -> Result<Vec<String>, CoreError> {
    if query.trim().is_empty() {
        return Err(CoreError::InvalidQuery("Query must not be empty".into()));
    }
    let mut seen = HashSet::new();
    let terms: Vec<String> = tokenize(query)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect();
    if terms.is_empty() {
        return Err(CoreError::InvalidQuery(
            "Query must contain at least one letter or digit".into(),
        ));
    }
    Ok(terms)
}

/// Build `ILIKE` patterns (`%term%`) with SQL wildcards escaped.
pub fn build_ilike_patterns(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .map(|t| {
            let escaped = t
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Lexical scoring
// ---------------------------------------------------------------------------

/// Deterministic keyword relevance of an article for the given query terms,
/// in `[0, 1]`. See the module docs for the formula.
pub fn lexical_score(terms: &[String], title: &str, body: &str) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }

    let title_tokens: HashSet<String> = tokenize(title).into_iter().collect();
    let mut body_tf: HashMap<String, usize> = HashMap::new();
    for token in tokenize(body) {
        *body_tf.entry(token).or_default() += 1;
    }

    let raw: f32 = terms
        .iter()
        .map(|term| {
            let title_part = if title_tokens.contains(term) {
                TITLE_TERM_WEIGHT
            } else {
                0.0
            };
            let tf = body_tf.get(term).copied().unwrap_or(0) as f32;
            title_part + BODY_TERM_WEIGHT * tf / (tf + 1.0)
        })
        .sum();

    let max = terms.len() as f32 * (TITLE_TERM_WEIGHT + BODY_TERM_WEIGHT);
    (raw / max).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Merge and rank
// ---------------------------------------------------------------------------

/// A candidate article with its signals, before ranking.
#[derive(Debug, Clone)]
pub struct RankCandidate {
    pub article_id: DbId,
    /// Timestamp of the article's newest revision.
    pub updated_at: Timestamp,
    pub lexical: f32,
    /// Normalized semantic score; `None` when the vector search did not
    /// return this article.
    pub semantic: Option<f32>,
}

/// A ranked search hit with its contributing sub-scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    pub article_id: DbId,
    pub score: f32,
    pub lexical_score: f32,
    pub semantic_score: Option<f32>,
    #[serde(skip)]
    pub updated_at: Timestamp,
}

/// Merge both signals, order and truncate.
///
/// When `semantic_available` is false every candidate is scored lexically
/// only. Candidates with neither a keyword match nor a semantic hit are
/// dropped.
pub fn rank_candidates(
    candidates: Vec<RankCandidate>,
    weights: &RankWeights,
    semantic_available: bool,
    top_k: usize,
) -> Vec<RankedHit> {
    let mut hits: Vec<RankedHit> = candidates
        .into_iter()
        .filter(|c| c.lexical > 0.0 || (semantic_available && c.semantic.is_some()))
        .map(|c| {
            let semantic = if semantic_available {
                Some(c.semantic.unwrap_or(0.0))
            } else {
                None
            };
            RankedHit {
                article_id: c.article_id,
                score: weights.combine(c.lexical, semantic),
                lexical_score: c.lexical,
                semantic_score: if semantic_available { c.semantic } else { None },
                updated_at: c.updated_at,
            }
        })
        .collect();

    hits.sort_by(compare_hits);
    hits.truncate(top_k);
    hits
}

/// Descending score, then newer revision, then ascending id.
fn compare_hits(a: &RankedHit, b: &RankedHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.updated_at.cmp(&a.updated_at))
        .then_with(|| a.article_id.cmp(&b.article_id))
}

// ---------------------------------------------------------------------------
// Snippets
// ---------------------------------------------------------------------------

/// Excerpt of `body` around the first occurrence of any query term.
///
/// Falls back to the start of the body when nothing matches. Whitespace is
/// collapsed and ellipses mark truncation.
pub fn build_snippet(body: &str, terms: &[String], max_chars: usize) -> String {
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let match_at = first_term_position(&chars, terms).unwrap_or(0);

    let start = match_at.saturating_sub(SNIPPET_LEAD_CHARS);
    let end = (start + max_chars).min(chars.len());
    if start >= end {
        return String::new();
    }

    let from = chars[start].0;
    let to = chars.get(end).map_or(body.len(), |(i, _)| *i);
    let excerpt = body[from..to].split_whitespace().collect::<Vec<_>>().join(" ");

    let mut snippet = String::with_capacity(excerpt.len() + 6);
    if start > 0 {
        snippet.push('…');
    }
    snippet.push_str(&excerpt);
    if end < chars.len() {
        snippet.push('…');
    }
    snippet
}

/// Char index of the first word in `chars` that equals one of `terms`.
fn first_term_position(chars: &[(usize, char)], terms: &[String]) -> Option<usize> {
    if terms.is_empty() {
        return None;
    }
    let mut word = String::new();
    let mut word_start = 0;
    for (idx, (_, c)) in chars.iter().enumerate() {
        if is_term_char(*c) {
            if word.is_empty() {
                word_start = idx;
            }
            word.extend(c.to_lowercase());
        } else if !word.is_empty() {
            if terms.contains(&word) {
                return Some(word_start);
            }
            word.clear();
        }
    }
    if !word.is_empty() && terms.contains(&word) {
        return Some(word_start);
    }
    None
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
