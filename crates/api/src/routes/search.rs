//! Route definitions for `/search`.

use axum::routing::get;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// Routes mounted at `/search`.
///
/// ```text
/// GET  /   -> search_get  (?q=&top_k=&tags=a,b)
/// POST /   -> search_post ({q, top_k, tags})
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(search::search_get).post(search::search_post))
}
