//! Integration tests for vector index bookkeeping.

use sqlx::PgPool;
use wikisearch_db::models::article::{CreateArticle, UpdateArticle};
use wikisearch_db::repositories::{ArticleRepo, EmbeddingRepo};

fn new_article(title: &str, body: &str) -> CreateArticle {
    CreateArticle {
        title: title.to_string(),
        body: body.to_string(),
        tags: Vec::new(),
        group_id: None,
        edit_summary: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stale_tracks_content_hash(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("A", "one"), None)
        .await
        .unwrap();

    // No record yet: missing.
    let stale = EmbeddingRepo::find_stale(&pool, 10).await.unwrap();
    assert_eq!(stale.len(), 1);

    assert!(EmbeddingRepo::upsert(&pool, article.id, &article.content_hash, "hashing", 256)
        .await
        .unwrap());
    assert!(EmbeddingRepo::find_stale(&pool, 10).await.unwrap().is_empty());

    let counts = EmbeddingRepo::status_counts(&pool).await.unwrap();
    assert_eq!((counts.articles, counts.fresh, counts.stale, counts.missing), (1, 1, 0, 0));

    // Editing the body makes the recorded vector stale.
    let edit = UpdateArticle {
        body: Some("two".into()),
        ..Default::default()
    };
    ArticleRepo::update(&pool, article.id, &edit, None).await.unwrap();
    let stale = EmbeddingRepo::find_stale(&pool, 10).await.unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, article.id);

    let counts = EmbeddingRepo::status_counts(&pool).await.unwrap();
    assert_eq!((counts.fresh, counts.stale), (0, 1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_for_deleted_article_is_a_no_op(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("A", "one"), None)
        .await
        .unwrap();
    ArticleRepo::delete(&pool, article.id).await.unwrap();

    let written = EmbeddingRepo::upsert(&pool, article.id, &article.content_hash, "hashing", 256)
        .await
        .unwrap();
    assert!(!written);
    assert!(EmbeddingRepo::find(&pool, article.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn upsert_with_outdated_hash_is_a_no_op(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("A", "one"), None)
        .await
        .unwrap();
    let edit = UpdateArticle {
        body: Some("two".into()),
        ..Default::default()
    };
    ArticleRepo::update(&pool, article.id, &edit, None).await.unwrap();

    let written = EmbeddingRepo::upsert(&pool, article.id, &article.content_hash, "hashing", 256)
        .await
        .unwrap();
    assert!(!written);
    assert_eq!(EmbeddingRepo::find_stale(&pool, 10).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn record_is_removed_with_article(pool: PgPool) {
    let article = ArticleRepo::create(&pool, &new_article("A", "one"), None)
        .await
        .unwrap();
    EmbeddingRepo::upsert(&pool, article.id, &article.content_hash, "hashing", 256)
        .await
        .unwrap();
    ArticleRepo::delete(&pool, article.id).await.unwrap();
    assert!(EmbeddingRepo::find(&pool, article.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tombstones_lifecycle(pool: PgPool) {
    EmbeddingRepo::add_tombstone(&pool, 7).await.unwrap();
    EmbeddingRepo::add_tombstone(&pool, 7).await.unwrap();
    EmbeddingRepo::add_tombstone(&pool, 8).await.unwrap();

    let pending = EmbeddingRepo::list_tombstones(&pool, 10).await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(EmbeddingRepo::status_counts(&pool).await.unwrap().tombstones, 2);

    EmbeddingRepo::record_tombstone_attempt(&pool, 7).await.unwrap();
    assert!(EmbeddingRepo::clear_tombstone(&pool, 7).await.unwrap());
    assert!(!EmbeddingRepo::clear_tombstone(&pool, 7).await.unwrap());
    assert_eq!(EmbeddingRepo::list_tombstones(&pool, 10).await.unwrap(), vec![8]);
}
