//! Handlers for `/search`.
//!
//! Both verbs feed the same [`SearchRequest`] into the ranking pipeline.
//! The response always succeeds when the article store is reachable;
//! `degraded: true` means the semantic signal was unavailable.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use wikisearch_core::article::normalize_tags;
use wikisearch_core::types::DbId;
use wikisearch_pipeline::{SearchOutcome, SearchRequest};

use crate::error::AppResult;
use crate::middleware::rbac::RequireReader;
use crate::query::split_csv;
use crate::response::DataResponse;
use crate::state::AppState;

/// `GET /search?q=&top_k=&tags=a,b`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub top_k: Option<i64>,
    pub tags: Option<String>,
}

/// GET /api/v1/search
pub async fn search_get(
    RequireReader(user): RequireReader,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let request = SearchRequest {
        q: params.q,
        top_k: params.top_k,
        tags: split_csv(params.tags.as_deref()),
    };
    run_search(&state, user.user_id, request).await
}

/// POST /api/v1/search
pub async fn search_post(
    RequireReader(user): RequireReader,
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> AppResult<impl IntoResponse> {
    run_search(&state, user.user_id, request).await
}

async fn run_search(
    state: &AppState,
    user_id: DbId,
    mut request: SearchRequest,
) -> AppResult<Json<DataResponse<SearchOutcome>>> {
    request.tags = normalize_tags(&request.tags)?;

    let outcome = state.pipeline.search(&request).await?;
    if outcome.degraded {
        tracing::debug!(user_id, "Search served without the semantic signal");
    }

    Ok(Json(DataResponse { data: outcome }))
}
