//! Capability-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 when the token's
//! role lacks the route's capability (see `wikisearch_core::roles`).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use wikisearch_core::error::CoreError;
use wikisearch_core::roles::Capability;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require(
    parts: &mut Parts,
    state: &AppState,
    capability: Capability,
    message: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.can(capability) {
        return Err(AppError::Core(CoreError::Forbidden(message.into())));
    }
    Ok(user)
}

/// Any authenticated role that may read articles and search.
pub struct RequireReader(pub AuthUser);

impl FromRequestParts<AppState> for RequireReader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, Capability::Read, "Read access required")
            .await
            .map(RequireReader)
    }
}

/// Author or admin: may create and edit articles.
///
/// ```ignore
/// async fn edit(RequireAuthor(user): RequireAuthor) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuthor(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuthor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, Capability::Write, "Author or Admin role required")
            .await
            .map(RequireAuthor)
    }
}

/// Admin only.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, Capability::Administer, "Admin role required")
            .await
            .map(RequireAdmin)
    }
}
