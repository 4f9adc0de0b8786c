//! Embedding constants, validation, similarity math and freshness state.
//!
//! Score convention: vector indexes report raw cosine similarity in
//! `[-1, 1]`. Everything downstream of the index works with the normalized
//! form `(s + 1) / 2` in `[0, 1]`, see [`normalize_cosine`].

use serde::Serialize;

use crate::error::CoreError;

/// Dimensionality of the default embedding model (Yandex `text-search-*`).
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 256;

/// What a piece of text is embedded for. Asymmetric models use different
/// encoders for stored documents and for search queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingPurpose {
    Document,
    Query,
}

/// Validate that an embedding vector has the expected dimensionality and
/// only finite components.
pub fn validate_embedding(embedding: &[f32], expected: usize) -> Result<(), CoreError> {
    if embedding.len() != expected {
        return Err(CoreError::Validation(format!(
            "Embedding must be {expected}-dimensional, got {}",
            embedding.len()
        )));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(CoreError::Validation(
            "Embedding contains non-finite components".into(),
        ));
    }
    Ok(())
}

/// Cosine similarity in `[-1, 1]`. Returns `0.0` for mismatched lengths or
/// zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Map a raw cosine similarity from `[-1, 1]` onto `[0, 1]`.
pub fn normalize_cosine(score: f32) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    ((score + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Scale a vector to unit length in place (no-op for zero vectors).
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

/// Whether an article's stored vector reflects its current content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingState {
    /// Vector computed from the current title and body.
    Fresh,
    /// Vector exists but was computed from an older revision.
    Stale,
    /// No vector yet (pending or failed indexing).
    Missing,
}

/// Classify freshness from the hash recorded with the vector (if any) and
/// the article's current content hash.
pub fn classify_embedding(recorded_hash: Option<&str>, current_hash: &str) -> EmbeddingState {
    match recorded_hash {
        None => EmbeddingState::Missing,
        Some(h) if h == current_hash => EmbeddingState::Fresh,
        Some(_) => EmbeddingState::Stale,
    }
}
