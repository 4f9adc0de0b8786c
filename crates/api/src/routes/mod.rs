pub mod admin;
pub mod articles;
pub mod auth;
pub mod groups;
pub mod health;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/sessions                                   own live sessions (GET)
///
/// /articles                                        list (?tag=&group_id=), create
/// /articles/{id}                                   get, update, delete
/// /articles/{id}/revisions                         list revisions
/// /articles/{id}/revisions/{n}                     get revision
/// /articles/{id}/revisions/{n}/restore             restore (POST)
/// /articles/{id}/diff                              line diff (?from=&to=)
/// /articles/{id}/related                           related articles (?k=)
///
/// /groups                                          list, create (admin)
///
/// /search                                          search (GET query, POST body)
///
/// /admin/users                                     list users (admin only)
/// /admin/users/{id}                                deactivate (DELETE)
/// /admin/users/{id}/role                           change role (PUT)
/// /admin/index/status                              index freshness (GET)
/// /admin/index/reconcile                           reconcile now (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/articles", articles::router())
        .nest("/groups", groups::router())
        .nest("/search", search::router())
        .nest("/admin", admin::router())
}
