//! Handlers for the `/articles` resource: CRUD, revision history, restore,
//! diff and related articles.
//!
//! Every successful write is followed by an index update once the store
//! transaction has committed. Index failures are logged by the indexer and
//! repaired by reconciliation; they never fail the write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use wikisearch_core::article::{
    compute_line_diff, normalize_tags, validate_body, validate_title,
};
use wikisearch_core::error::CoreError;
use wikisearch_core::roles::Capability;
use wikisearch_core::search::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use wikisearch_core::types::{DbId, RevisionNumber};
use wikisearch_db::models::article::{Article, CreateArticle, UpdateArticle, UpdateOutcome};
use wikisearch_db::models::revision::Revision;
use wikisearch_db::repositories::{ArticleRepo, GroupRepo, RevisionRepo};
use wikisearch_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuthor, RequireReader};
use crate::response::{DataResponse, Page};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListArticlesParams {
    pub tag: Option<String>,
    pub group_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `?from=&to=`. `to` defaults to the current revision.
#[derive(Debug, Deserialize)]
pub struct DiffParams {
    pub from: RevisionNumber,
    pub to: Option<RevisionNumber>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedParams {
    pub k: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DiffLineDto {
    pub line_type: &'static str,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DiffResponse {
    pub article_id: DbId,
    pub from: RevisionNumber,
    pub to: RevisionNumber,
    pub title_changed: bool,
    pub lines: Vec<DiffLineDto>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch an article or return 404.
async fn ensure_article(pool: &DbPool, id: DbId) -> AppResult<Article> {
    ArticleRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Article",
            id,
        }))
}

/// Fetch one revision of an article or return 404.
async fn ensure_revision(
    pool: &DbPool,
    article_id: DbId,
    number: RevisionNumber,
) -> AppResult<Revision> {
    RevisionRepo::find_by_article_and_number(pool, article_id, number)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Revision",
            id: DbId::from(number),
        }))
}

/// Reject a group id that does not exist with a 400.
async fn ensure_group(pool: &DbPool, group_id: Option<DbId>) -> AppResult<()> {
    match group_id {
        Some(id) if !GroupRepo::exists(pool, id).await? => Err(AppError::Core(
            CoreError::Validation(format!("Group {id} does not exist")),
        )),
        _ => Ok(()),
    }
}

/// Owners may delete or restore their own articles; anyone else needs the
/// moderate capability.
fn ensure_can_moderate(user: &AuthUser, article: &Article) -> AppResult<()> {
    if article.owner_id == Some(user.user_id) || user.can(Capability::Moderate) {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "Only the owner or an admin may do this".into(),
    )))
}

/// Map the outcome of a guarded update onto the API's errors.
fn updated_or_error(
    id: DbId,
    expected: Option<RevisionNumber>,
    outcome: UpdateOutcome,
) -> AppResult<Article> {
    match outcome {
        UpdateOutcome::Updated(article) => Ok(article),
        UpdateOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Article",
            id,
        })),
        UpdateOutcome::RevisionMismatch { current } => {
            Err(AppError::Core(CoreError::Conflict(format!(
                "Article {id} is at revision {current}, expected {}",
                expected.unwrap_or(current)
            ))))
        }
    }
}

// ---------------------------------------------------------------------------
// Article CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/articles
///
/// List articles, most recently edited first, optionally filtered by tag
/// and group.
pub async fn list_articles(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
    Query(params): Query<ListArticlesParams>,
) -> AppResult<impl IntoResponse> {
    let tag = params
        .tag
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let (items, total) = tokio::try_join!(
        ArticleRepo::list(&state.pool, tag.as_deref(), params.group_id, limit, offset),
        ArticleRepo::count(&state.pool, tag.as_deref(), params.group_id),
    )?;

    Ok(Json(DataResponse {
        data: Page {
            items,
            total,
            limit,
            offset,
        },
    }))
}

/// POST /api/v1/articles
///
/// Create an article (revision 1) owned by the caller.
pub async fn create_article(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Json(mut input): Json<CreateArticle>,
) -> AppResult<impl IntoResponse> {
    validate_title(&input.title)?;
    validate_body(&input.body)?;
    input.tags = normalize_tags(&input.tags)?;
    ensure_group(&state.pool, input.group_id).await?;

    let article = ArticleRepo::create(&state.pool, &input, Some(user.user_id)).await?;

    tracing::info!(
        user_id = user.user_id,
        article_id = article.id,
        "Article created"
    );

    state.indexer.index_article(&article).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: article })))
}

/// GET /api/v1/articles/{id}
pub async fn get_article(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let article = ensure_article(&state.pool, id).await?;
    Ok(Json(DataResponse { data: article }))
}

/// PUT /api/v1/articles/{id}
///
/// Apply an edit as a new revision. Omitted fields keep their current value.
/// With `expected_revision`, the edit is rejected with 409 unless the article
/// is still at that revision.
pub async fn update_article(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateArticle>,
) -> AppResult<impl IntoResponse> {
    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(body) = &input.body {
        validate_body(body)?;
    }
    if let Some(tags) = &input.tags {
        input.tags = Some(normalize_tags(tags)?);
    }
    ensure_group(&state.pool, input.group_id.flatten()).await?;

    let outcome = ArticleRepo::update(&state.pool, id, &input, Some(user.user_id)).await?;
    let article = updated_or_error(id, input.expected_revision, outcome)?;

    tracing::info!(
        user_id = user.user_id,
        article_id = id,
        revision = article.current_revision,
        "Article updated"
    );

    state.indexer.index_article(&article).await;

    Ok(Json(DataResponse { data: article }))
}

/// DELETE /api/v1/articles/{id}
///
/// Hard delete, cascading to revisions and the embedding record. The vector
/// is removed afterwards; a failed removal leaves a tombstone for
/// reconciliation.
pub async fn delete_article(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let article = ensure_article(&state.pool, id).await?;
    ensure_can_moderate(&user, &article)?;

    if !ArticleRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Article",
            id,
        }));
    }

    tracing::info!(user_id = user.user_id, article_id = id, "Article deleted");

    state.indexer.remove_article(id).await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Revisions
// ---------------------------------------------------------------------------

/// GET /api/v1/articles/{id}/revisions
///
/// Revision summaries, newest first.
pub async fn list_revisions(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_article(&state.pool, id).await?;
    let revisions = RevisionRepo::list_by_article(&state.pool, id).await?;
    Ok(Json(DataResponse { data: revisions }))
}

/// GET /api/v1/articles/{id}/revisions/{n}
pub async fn get_revision(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
    Path((id, number)): Path<(DbId, RevisionNumber)>,
) -> AppResult<impl IntoResponse> {
    ensure_article(&state.pool, id).await?;
    let revision = ensure_revision(&state.pool, id, number).await?;
    Ok(Json(DataResponse { data: revision }))
}

/// POST /api/v1/articles/{id}/revisions/{n}/restore
///
/// Write revision `n`'s snapshot back as a new revision. History is never
/// rewritten.
pub async fn restore_revision(
    RequireAuthor(user): RequireAuthor,
    State(state): State<AppState>,
    Path((id, number)): Path<(DbId, RevisionNumber)>,
) -> AppResult<impl IntoResponse> {
    let article = ensure_article(&state.pool, id).await?;
    ensure_can_moderate(&user, &article)?;
    let revision = ensure_revision(&state.pool, id, number).await?;

    let outcome = ArticleRepo::restore(&state.pool, id, &revision, Some(user.user_id)).await?;
    let restored = updated_or_error(id, None, outcome)?;

    tracing::info!(
        user_id = user.user_id,
        article_id = id,
        restored_from = number,
        revision = restored.current_revision,
        "Article revision restored"
    );

    state.indexer.index_article(&restored).await;

    Ok(Json(DataResponse { data: restored }))
}

/// GET /api/v1/articles/{id}/diff?from=X&to=Y
///
/// Line-level diff of the body between two revisions.
pub async fn diff_revisions(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<DiffParams>,
) -> AppResult<impl IntoResponse> {
    let article = ensure_article(&state.pool, id).await?;
    let to_number = params.to.unwrap_or(article.current_revision);

    let (from, to) = tokio::try_join!(
        ensure_revision(&state.pool, id, params.from),
        ensure_revision(&state.pool, id, to_number),
    )?;

    let lines = compute_line_diff(&from.body, &to.body)
        .into_iter()
        .map(|d| DiffLineDto {
            line_type: d.line_type.as_str(),
            content: d.content,
        })
        .collect();

    Ok(Json(DataResponse {
        data: DiffResponse {
            article_id: id,
            from: from.revision_number,
            to: to.revision_number,
            title_changed: from.title != to.title,
            lines,
        },
    }))
}

/// GET /api/v1/articles/{id}/related?k=
///
/// Articles semantically close to this one.
pub async fn related_articles(
    RequireReader(_user): RequireReader,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<RelatedParams>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.pipeline.related(id, params.k).await?;
    Ok(Json(DataResponse { data: outcome }))
}
