//! Route definitions for the `/articles` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::articles;
use crate::state::AppState;

/// Routes mounted at `/articles`.
///
/// Reads need any role, writes need `author` or `admin` (enforced by
/// handler extractors).
///
/// ```text
/// GET    /                                -> list_articles
/// POST   /                                -> create_article
/// GET    /{id}                            -> get_article
/// PUT    /{id}                            -> update_article
/// DELETE /{id}                            -> delete_article
/// GET    /{id}/revisions                  -> list_revisions
/// GET    /{id}/revisions/{n}              -> get_revision
/// POST   /{id}/revisions/{n}/restore      -> restore_revision
/// GET    /{id}/diff                       -> diff_revisions
/// GET    /{id}/related                    -> related_articles
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        .route("/{id}/revisions", get(articles::list_revisions))
        .route("/{id}/revisions/{n}", get(articles::get_revision))
        .route(
            "/{id}/revisions/{n}/restore",
            post(articles::restore_revision),
        )
        .route("/{id}/diff", get(articles::diff_revisions))
        .route("/{id}/related", get(articles::related_articles))
}
