//! HTTP-level tests for blended search, related articles and the admin index
//! endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_article, delete_auth, get_auth, post_auth, post_json_auth, user_token,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use wikisearch_core::roles::Role;

fn result_ids(json: &Value) -> Vec<i64> {
    json["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["article_id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn lexical_only_search_finds_keyword_match(pool: PgPool) {
    let (_, token) = user_token(&pool, "author@test.com", Role::Author).await;
    let app = common::build_lexical_only_app(pool);

    let article = create_article(
        app.clone(),
        &token,
        "Glossary",
        "vector search uses embeddings",
        &[],
    )
    .await;
    create_article(app.clone(), &token, "Cooking", "how to boil pasta", &[]).await;

    let response = get_auth(app, "/api/v1/search?q=embeddings", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["degraded"], true);
    let results = json["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["article_id"], article["id"]);
    assert!(results[0]["lexical_score"].as_f64().unwrap() > 0.0);
    assert!(results[0]["semantic_score"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blended_search_respects_top_k_and_ordering(pool: PgPool) {
    let (_, token) = user_token(&pool, "author@test.com", Role::Author).await;
    let app = common::build_test_app(pool);

    for (title, body) in [
        ("Rust ownership", "rust borrow checker and ownership rules"),
        ("Rust async", "async rust with tokio runtimes"),
        ("Rust macros", "declarative rust macros"),
        ("Gardening", "tomatoes need sun"),
    ] {
        create_article(app.clone(), &token, title, body, &[]).await;
    }

    let response = get_auth(app.clone(), "/api/v1/search?q=rust&top_k=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["degraded"], false);

    let scores: Vec<f64> = json["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(!scores.is_empty() && scores.len() <= 2);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let response = post_json_auth(
        app,
        "/api/v1/search",
        json!({ "q": "rust", "top_k": 10 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(result_ids(&json).len() >= 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_query_is_rejected(pool: PgPool) {
    let (_, token) = user_token(&pool, "reader@test.com", Role::Reader).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/search?q=%20%20", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_QUERY");

    let response = post_json_auth(app.clone(), "/api/v1/search", json!({ "q": "" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(app, "/api/v1/search", json!({ "top_k": 3 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_QUERY");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tag_filter_applies_to_get_and_post(pool: PgPool) {
    let (_, token) = user_token(&pool, "author@test.com", Role::Author).await;
    let app = common::build_lexical_only_app(pool);

    create_article(app.clone(), &token, "Indexes", "postgres indexes", &["db"]).await;
    let tagged = create_article(
        app.clone(),
        &token,
        "Vacuum",
        "postgres vacuum tuning",
        &["db", "ops"],
    )
    .await;

    let json = body_json(get_auth(app.clone(), "/api/v1/search?q=postgres", &token).await).await;
    assert_eq!(result_ids(&json).len(), 2);

    let json = body_json(
        get_auth(app.clone(), "/api/v1/search?q=postgres&tags=DB,ops", &token).await,
    )
    .await;
    assert_eq!(result_ids(&json), vec![tagged["id"].as_i64().unwrap()]);

    let response = post_json_auth(
        app,
        "/api/v1/search",
        json!({ "q": "postgres", "tags": ["ops"] }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(result_ids(&json), vec![tagged["id"].as_i64().unwrap()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_article_disappears_from_search(pool: PgPool) {
    let (_, token) = user_token(&pool, "author@test.com", Role::Author).await;
    let app = common::build_test_app(pool);

    let article = create_article(app.clone(), &token, "Ephemeral", "short lived page", &[]).await;
    let uri = format!("/api/v1/articles/{}", article["id"]);

    let json = body_json(get_auth(app.clone(), "/api/v1/search?q=ephemeral", &token).await).await;
    assert_eq!(result_ids(&json), vec![article["id"].as_i64().unwrap()]);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, "/api/v1/search?q=ephemeral", &token).await).await;
    assert!(result_ids(&json).is_empty());
}

// ---------------------------------------------------------------------------
// Related
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn related_never_includes_the_article_itself(pool: PgPool) {
    let (_, token) = user_token(&pool, "author@test.com", Role::Author).await;
    let app = common::build_test_app(pool);

    let subject =
        create_article(app.clone(), &token, "Tokio", "tokio async runtime tasks", &[]).await;
    create_article(app.clone(), &token, "Async", "async tasks in rust", &[]).await;
    create_article(app.clone(), &token, "Futures", "futures and async runtime", &[]).await;

    let uri = format!("/api/v1/articles/{}/related?k=5", subject["id"]);
    let response = get_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids = result_ids(&json);
    assert!(!ids.is_empty());
    assert!(!ids.contains(&subject["id"].as_i64().unwrap()));

    let response = get_auth(app, "/api/v1/articles/424242/related", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Admin index endpoints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn index_status_reports_fresh_embeddings(pool: PgPool) {
    let (_, author) = user_token(&pool, "author@test.com", Role::Author).await;
    let (_, admin) = user_token(&pool, "admin@test.com", Role::Admin).await;
    let app = common::build_test_app(pool);

    create_article(app.clone(), &author, "One", "first article", &[]).await;
    create_article(app.clone(), &author, "Two", "second article", &[]).await;

    let response = get_auth(app.clone(), "/api/v1/admin/index/status", &author).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), "/api/v1/admin/index/status", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["articles"], 2);
    assert_eq!(json["data"]["fresh"], 2);
    assert_eq!(json["data"]["missing"], 0);
    assert_eq!(json["data"]["backend"], "memory");
    assert_eq!(json["data"]["dimension"], common::DIM);
    assert_eq!(json["data"]["provider_enabled"], true);

    let response = post_auth(app, "/api/v1/admin/index/reconcile", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["scanned"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disabled_provider_leaves_articles_unembedded(pool: PgPool) {
    let (_, author) = user_token(&pool, "author@test.com", Role::Author).await;
    let (_, admin) = user_token(&pool, "admin@test.com", Role::Admin).await;
    let app = common::build_lexical_only_app(pool);

    create_article(app.clone(), &author, "Plain", "no vectors here", &[]).await;

    let json =
        body_json(get_auth(app.clone(), "/api/v1/admin/index/status", &admin).await).await;
    assert_eq!(json["data"]["articles"], 1);
    assert_eq!(json["data"]["missing"], 1);
    assert_eq!(json["data"]["provider_enabled"], false);

    // Reconciliation skips re-embedding while the provider is off.
    let json = body_json(post_auth(app, "/api/v1/admin/index/reconcile", &admin).await).await;
    assert_eq!(json["data"]["scanned"], 0);
    assert_eq!(json["data"]["failed"], 0);
}
