//! Handlers for the `/admin` resource: user roles and the search index.
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use wikisearch_core::error::CoreError;
use wikisearch_core::roles::Role;
use wikisearch_core::types::DbId;
use wikisearch_db::models::user::UserResponse;
use wikisearch_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use wikisearch_pipeline::{IndexStatus, ReconcileReport};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// GET /api/v1/admin/users
///
/// List all users with their roles.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let (users, roles) = tokio::try_join!(
        UserRepo::list(&state.pool),
        RoleRepo::list(&state.pool),
    )?;

    let roles: HashMap<DbId, Role> = roles
        .iter()
        .filter_map(|r| Some((r.id, r.role()?)))
        .collect();
    let data = users
        .iter()
        .map(|u| UserResponse::from_user(u, roles.get(&u.role_id).copied()))
        .collect();

    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Change a user's role. Takes effect on the user's next login or token
/// refresh.
pub async fn set_user_role(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id && input.role != Role::Admin {
        return Err(AppError::BadRequest(
            "Admins cannot remove their own admin role".into(),
        ));
    }

    let role_id = RoleRepo::id_of(&state.pool, input.role)
        .await?
        .ok_or_else(|| AppError::InternalError(format!("Role '{}' is not seeded", input.role)))?;

    let user = UserRepo::set_role(&state.pool, id, role_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        role = %input.role,
        "User role changed"
    );

    Ok(Json(DataResponse {
        data: UserResponse::from_user(&user, Some(input.role)),
    }))
}

/// DELETE /api/v1/admin/users/{id}
///
/// Deactivate an account and revoke its sessions. Existing access tokens
/// stay valid until they expire; login and refresh are refused.
pub async fn deactivate_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "Admins cannot deactivate their own account".into(),
        ));
    }

    if !UserRepo::deactivate(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        revoked_sessions = revoked,
        "User deactivated"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/admin/index/status
///
/// Embedding freshness counts and the configured semantic backends.
pub async fn index_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<IndexStatus>>> {
    let status = state.indexer.status().await?;
    Ok(Json(DataResponse { data: status }))
}

/// POST /api/v1/admin/index/reconcile
///
/// Run one reconciliation pass now instead of waiting for the background
/// loop.
pub async fn reconcile_index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<ReconcileReport>>> {
    let report = state
        .indexer
        .reconcile(state.config.reconcile_batch_size)
        .await?;

    tracing::info!(
        admin_id = admin.user_id,
        reembedded = report.reembedded,
        failed = report.failed,
        "Manual reconciliation finished"
    );

    Ok(Json(DataResponse { data: report }))
}
