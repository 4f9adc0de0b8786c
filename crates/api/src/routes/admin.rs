//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /users              -> list_users
/// DELETE /users/{id}        -> deactivate_user
/// PUT  /users/{id}/role    -> set_user_role
/// GET  /index/status       -> index_status
/// POST /index/reconcile    -> reconcile_index
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::deactivate_user))
        .route("/users/{id}/role", put(admin::set_user_role))
        .route("/index/status", get(admin::index_status))
        .route("/index/reconcile", post(admin::reconcile_index))
}
