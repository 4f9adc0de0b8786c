//! Liveness endpoint, mounted at the root rather than under `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub search: SearchHealth,
}

/// Configured search backends. Not a connectivity check: semantic failures
/// degrade individual searches instead of the service.
#[derive(Serialize)]
pub struct SearchHealth {
    /// `blended` with an enabled embedding provider, else `lexical`.
    pub mode: &'static str,
    pub index_backend: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = wikisearch_db::health_check(&state.pool).await.is_ok();
    if !db_healthy {
        tracing::warn!("Health check: database unreachable");
    }

    let mode = if state.indexer.semantic_enabled() {
        "blended"
    } else {
        "lexical"
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        search: SearchHealth {
            mode,
            index_backend: state.indexer.backend(),
        },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
