//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use wikisearch_api::auth::jwt::{generate_access_token, JwtConfig};
use wikisearch_api::auth::password::hash_password;
use wikisearch_api::config::{EmbeddingConfig, ProviderKind, QdrantConfig, ServerConfig};
use wikisearch_api::router::build_app_router;
use wikisearch_api::state::AppState;
use wikisearch_core::roles::Role;
use wikisearch_core::search::SearchSettings;
use wikisearch_db::models::user::{CreateUser, User};
use wikisearch_db::repositories::{RoleRepo, UserRepo};
use wikisearch_semantic::{
    DisabledEmbedder, EmbeddingProvider, HashingEmbedder, MemoryVectorIndex,
};

pub const DIM: usize = 64;
pub const PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and a small embedding
/// dimension.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:8501".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 30,
        },
        embedding: EmbeddingConfig {
            provider: ProviderKind::Hashing,
            yandex_token: None,
            yandex_folder_id: None,
            yandex_url: "http://127.0.0.1:1/embed".to_string(),
            dimension: DIM,
        },
        qdrant: QdrantConfig {
            url: None,
            collection: "articles".to_string(),
            api_key: None,
        },
        semantic_timeout: Duration::from_millis(500),
        search: SearchSettings::default(),
        reconcile_interval: Duration::from_secs(60),
        reconcile_batch_size: 100,
        bootstrap_admin: None,
    }
}

/// Full application router over the hashing embedder and an in-memory index.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(HashingEmbedder::new(DIM)))
}

/// Same router with the embedding provider switched off.
pub fn build_lexical_only_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(DisabledEmbedder::new(DIM)))
}

pub fn build_test_app_with(pool: PgPool, provider: Arc<dyn EmbeddingProvider>) -> Router {
    let index = Arc::new(MemoryVectorIndex::new(DIM));
    let state = AppState::new(pool, test_config(), provider, index);
    build_app_router(state)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Insert a user with [`PASSWORD`] and the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: Role) -> User {
    let role_id = RoleRepo::id_of(pool, role)
        .await
        .unwrap()
        .expect("roles are seeded by migrations");
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            role_id,
        },
    )
    .await
    .unwrap()
}

/// Create a user and mint an access token for it.
pub async fn user_token(pool: &PgPool, email: &str, role: Role) -> (User, String) {
    let user = create_user(pool, email, role).await;
    let token = generate_access_token(user.id, role, &test_config().jwt).unwrap();
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Create an article through the API and return its JSON representation.
pub async fn create_article(
    app: Router,
    token: &str,
    title: &str,
    body: &str,
    tags: &[&str],
) -> serde_json::Value {
    let payload = serde_json::json!({ "title": title, "body": body, "tags": tags });
    let response = post_json_auth(app, "/api/v1/articles", payload, token).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}
