//! Route definitions for the `/groups` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::groups;
use crate::state::AppState;

/// ```text
/// GET  / -> list_groups  (any role)
/// POST / -> create_group (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(groups::list_groups).post(groups::create_group))
}
