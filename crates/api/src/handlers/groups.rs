//! Handlers for the `/groups` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use wikisearch_core::article::normalize_group_name;
use wikisearch_db::models::group::CreateGroup;
use wikisearch_db::repositories::GroupRepo;

use crate::error::AppResult;
use crate::middleware::rbac::{RequireAdmin, RequireReader};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/groups
pub async fn list_groups(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let groups = GroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /api/v1/groups
///
/// Admin only. A name already in use, ignoring case, is a 409.
pub async fn create_group(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateGroup>,
) -> AppResult<impl IntoResponse> {
    input.name = normalize_group_name(&input.name)?;
    input.description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let group = GroupRepo::create(&state.pool, &input, Some(admin.user_id)).await?;

    tracing::info!(admin_id = admin.user_id, group_id = group.id, "Article group created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}
