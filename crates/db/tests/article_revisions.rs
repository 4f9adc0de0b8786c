//! Integration tests for article writes and their revision history.

use sqlx::PgPool;
use wikisearch_core::article::content_hash;
use wikisearch_db::models::article::{CreateArticle, UpdateArticle, UpdateOutcome};
use wikisearch_db::repositories::{ArticleRepo, RevisionRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_article(title: &str, body: &str, tags: &[&str]) -> CreateArticle {
    CreateArticle {
        title: title.to_string(),
        body: body.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        group_id: None,
        edit_summary: None,
    }
}

fn body_update(body: &str) -> UpdateArticle {
    UpdateArticle {
        body: Some(body.to_string()),
        ..Default::default()
    }
}

fn expect_updated(outcome: UpdateOutcome) -> wikisearch_db::models::article::Article {
    match outcome {
        UpdateOutcome::Updated(a) => a,
        other => panic!("expected Updated, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_writes_revision_one(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("Glossary", "vector search", &["ml"]), None)
        .await
        .unwrap();

    assert_eq!(article.current_revision, 1);
    assert_eq!(article.content_hash, content_hash("Glossary", "vector search"));
    assert_eq!(article.tags, vec!["ml"]);

    let rev = RevisionRepo::find_by_article_and_number(&pool, article.id, 1)
        .await
        .unwrap()
        .expect("revision 1 exists");
    assert_eq!(rev.title, "Glossary");
    assert_eq!(rev.body, "vector search");
    assert_eq!(rev.edit_summary.as_deref(), Some("Initial revision"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_appends_next_revision_and_keeps_unset_fields(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("Glossary", "vector search", &["ml"]), None)
        .await
        .unwrap();

    let updated = expect_updated(
        ArticleRepo::update(&pool, article.id, &body_update("vector search uses embeddings"), None)
            .await
            .unwrap(),
    );

    assert_eq!(updated.current_revision, 2);
    assert_eq!(updated.title, "Glossary");
    assert_eq!(updated.tags, vec!["ml"]);
    assert_eq!(updated.body, "vector search uses embeddings");
    assert_ne!(updated.content_hash, article.content_hash);
    assert!(updated.updated_at >= article.updated_at);

    // The old revision is untouched.
    let first = RevisionRepo::find_by_article_and_number(&pool, article.id, 1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.body, "vector search");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_missing_article_is_not_found(pool: PgPool) {
    let outcome = ArticleRepo::update(&pool, 9999, &body_update("x"), None)
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::NotFound));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_expected_revision_is_rejected(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("A", "one", &[]), None)
        .await
        .unwrap();
    expect_updated(
        ArticleRepo::update(&pool, article.id, &body_update("two"), None)
            .await
            .unwrap(),
    );

    let stale = UpdateArticle {
        body: Some("three".into()),
        expected_revision: Some(1),
        ..Default::default()
    };
    let outcome = ArticleRepo::update(&pool, article.id, &stale, None)
        .await
        .unwrap();
    assert!(matches!(outcome, UpdateOutcome::RevisionMismatch { current: 2 }));

    // Nothing was written.
    let revisions = RevisionRepo::list_by_article(&pool, article.id).await.unwrap();
    assert_eq!(revisions.len(), 2);
    assert_eq!(revisions[0].revision_number, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_updates_get_distinct_sequential_revisions(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("A", "base", &[]), None)
        .await
        .unwrap();

    let left = body_update("left");
    let right = body_update("right");
    let (a, b) = tokio::join!(
        ArticleRepo::update(&pool, article.id, &left, None),
        ArticleRepo::update(&pool, article.id, &right, None),
    );
    let mut numbers = vec![
        expect_updated(a.unwrap()).current_revision,
        expect_updated(b.unwrap()).current_revision,
    ];
    numbers.sort();
    assert_eq!(numbers, vec![2, 3]);

    let history = RevisionRepo::list_by_article(&pool, article.id).await.unwrap();
    let listed: Vec<i32> = history.iter().map(|r| r.revision_number).collect();
    assert_eq!(listed, vec![3, 2, 1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restore_creates_new_revision_with_old_content(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("Title v1", "body v1", &["a"]), None)
        .await
        .unwrap();
    let edit = UpdateArticle {
        title: Some("Title v2".into()),
        body: Some("body v2".into()),
        tags: Some(vec!["b".into()]),
        ..Default::default()
    };
    expect_updated(ArticleRepo::update(&pool, article.id, &edit, None).await.unwrap());

    let first = RevisionRepo::find_by_article_and_number(&pool, article.id, 1)
        .await
        .unwrap()
        .unwrap();
    let restored = expect_updated(
        ArticleRepo::restore(&pool, article.id, &first, None)
            .await
            .unwrap(),
    );

    assert_eq!(restored.current_revision, 3);
    assert_eq!(restored.title, "Title v1");
    assert_eq!(restored.body, "body v1");
    assert_eq!(restored.tags, vec!["a"]);
    assert_eq!(restored.content_hash, article.content_hash);

    let third = RevisionRepo::find_by_article_and_number(&pool, article.id, 3)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(third.edit_summary.as_deref(), Some("Restored revision 1"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_cascades_revisions(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("Gone", "soon", &[]), None)
        .await
        .unwrap();

    assert!(ArticleRepo::delete(&pool, article.id).await.unwrap());
    assert!(!ArticleRepo::delete(&pool, article.id).await.unwrap());
    assert!(ArticleRepo::find_by_id(&pool, article.id).await.unwrap().is_none());
    assert!(RevisionRepo::list_by_article(&pool, article.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_by_tag_and_counts(pool: PgPool) {
    ArticleRepo::create(&pool, &new_article("One", "x", &["rust"]), None)
        .await
        .unwrap();
    ArticleRepo::create(&pool, &new_article("Two", "y", &["rust", "search"]), None)
        .await
        .unwrap();
    ArticleRepo::create(&pool, &new_article("Three", "z", &["python"]), None)
        .await
        .unwrap();

    assert_eq!(ArticleRepo::count(&pool, None, None).await.unwrap(), 3);
    assert_eq!(ArticleRepo::count(&pool, Some("rust"), None).await.unwrap(), 2);

    let page = ArticleRepo::list(&pool, Some("rust"), None, 1, 0).await.unwrap();
    assert_eq!(page.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn keyword_candidates_match_title_or_body(pool: PgPool) {
    let a = ArticleRepo::create(&pool, &new_article("Vector search", "intro", &["ml"]), None)
        .await
        .unwrap();
    let b = ArticleRepo::create(&pool, &new_article("Other", "uses VECTOR maths", &[]), None)
        .await
        .unwrap();
    ArticleRepo::create(&pool, &new_article("Cooking", "pasta", &[]), None)
        .await
        .unwrap();

    let terms = vec!["vector".to_string()];
    let mut ids: Vec<i64> = ArticleRepo::keyword_candidates(&pool, &terms, None, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec![a.id, b.id]);

    let tags = vec!["ml".to_string()];
    let tagged = ArticleRepo::keyword_candidates(&pool, &terms, Some(&tags), 10)
        .await
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].id, a.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn keyword_candidates_rank_title_matches_before_newer_mentions(pool: PgPool) {
    let strong = ArticleRepo::create(
        &pool,
        &new_article("Rust", "rust ownership rust borrow rust", &[]),
        None,
    )
    .await
    .unwrap();
    for i in 0..5 {
        ArticleRepo::create(
            &pool,
            &new_article(&format!("Note {i}"), "a passing mention of rust", &[]),
            None,
        )
        .await
        .unwrap();
    }

    let terms = vec!["rust".to_string()];
    let found = ArticleRepo::keyword_candidates(&pool, &terms, None, 2)
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].id, strong.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn keyword_candidates_treat_wildcards_literally(pool: PgPool) {
    let literal = ArticleRepo::create(&pool, &new_article("Discounts", "save 50% today", &[]), None)
        .await
        .unwrap();
    ArticleRepo::create(&pool, &new_article("Other", "save 500 today", &[]), None)
        .await
        .unwrap();

    let terms = vec!["50%".to_string()];
    let found = ArticleRepo::keyword_candidates(&pool, &terms, None, 10)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, literal.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn find_many_skips_missing_ids(pool: PgPool) {
    let a = ArticleRepo::create(&pool, &new_article("A", "a", &[]), None)
        .await
        .unwrap();
    let found = ArticleRepo::find_many(&pool, &[a.id, 424242], None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert!(ArticleRepo::find_many(&pool, &[], None).await.unwrap().is_empty());
}
