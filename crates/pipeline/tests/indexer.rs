//! Integration tests for indexing and reconciliation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use wikisearch_core::article::embedding_text;
use wikisearch_core::embedding::{EmbeddingPurpose, EmbeddingState};
use wikisearch_db::models::article::{Article, UpdateArticle, UpdateOutcome};
use wikisearch_db::repositories::{ArticleRepo, EmbeddingRepo};
use wikisearch_pipeline::ReconcileReport;
use wikisearch_semantic::{EmbeddingProvider, VectorIndex};

use common::*;

#[sqlx::test(migrations = "../../db/migrations")]
async fn index_article_records_fresh_embedding(pool: PgPool) {
    let article = create_article(&pool, "Glossary", "vector search uses embeddings", &[]).await;
    let index = memory_index();
    let indexer = indexer(&pool, hashing(), index.clone());

    assert!(indexer.index_article(&article).await);
    assert!(index.contains(article.id).await);

    let record = EmbeddingRepo::find(&pool, article.id).await.unwrap().unwrap();
    assert_eq!(record.content_hash, article.content_hash);
    assert_eq!(record.dimension, DIM as i32);
    assert_eq!(
        wikisearch_core::embedding::classify_embedding(
            Some(&record.content_hash),
            &article.content_hash
        ),
        EmbeddingState::Fresh
    );

    let status = indexer.status().await.unwrap();
    assert_eq!(status.counts.fresh, 1);
    assert_eq!(status.backend, "memory");
    assert!(status.provider_enabled);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_indexing_is_repaired_by_reconcile(pool: PgPool) {
    let article = create_article(&pool, "Glossary", "vector search uses embeddings", &[]).await;
    let index = memory_index();

    let broken = indexer(&pool, Arc::new(FailingEmbedder), index.clone());
    assert!(!broken.index_article(&article).await);
    assert!(EmbeddingRepo::find(&pool, article.id).await.unwrap().is_none());

    let healthy = indexer(&pool, hashing(), index.clone());
    let report = healthy.reconcile(100).await.unwrap();
    assert_eq!(
        report,
        ReconcileReport {
            scanned: 1,
            reembedded: 1,
            failed: 0,
            tombstones_cleared: 0,
        }
    );
    assert!(index.contains(article.id).await);

    // Nothing left to do on the next pass.
    assert_eq!(healthy.reconcile(100).await.unwrap(), ReconcileReport::default());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn edits_make_embedding_stale_until_reindexed(pool: PgPool) {
    let article = create_article(&pool, "A", "first body", &[]).await;
    let index = memory_index();
    let indexer = indexer(&pool, hashing(), index);
    indexer.index_article(&article).await;

    let edit = UpdateArticle {
        body: Some("second body".into()),
        ..Default::default()
    };
    let UpdateOutcome::Updated(_) = ArticleRepo::update(&pool, article.id, &edit, None)
        .await
        .unwrap()
    else {
        panic!("update failed");
    };

    assert_eq!(indexer.status().await.unwrap().counts.stale, 1);
    let report = indexer.reconcile(100).await.unwrap();
    assert_eq!(report.reembedded, 1);
    assert_eq!(indexer.status().await.unwrap().counts.fresh, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reconcile_counts_failures(pool: PgPool) {
    create_article(&pool, "A", "one", &[]).await;
    create_article(&pool, "B", "two", &[]).await;

    let report = indexer(&pool, hashing(), Arc::new(DownIndex))
        .reconcile(100)
        .await
        .unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.failed, 2);
    assert_eq!(report.reembedded, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn disabled_provider_skips_reembedding(pool: PgPool) {
    create_article(&pool, "A", "one", &[]).await;
    let indexer = indexer(&pool, disabled(), memory_index());

    assert_eq!(indexer.reconcile(100).await.unwrap(), ReconcileReport::default());
    let status = indexer.status().await.unwrap();
    assert_eq!(status.counts.missing, 1);
    assert!(!status.provider_enabled);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_removal_leaves_tombstone_that_reconcile_clears(pool: PgPool) {
    let article = create_article(&pool, "A", "one", &[]).await;
    let index = memory_index();
    indexer(&pool, hashing(), index.clone()).index_article(&article).await;
    ArticleRepo::delete(&pool, article.id).await.unwrap();

    let broken = indexer(&pool, hashing(), Arc::new(DownIndex));
    assert!(!broken.remove_article(article.id).await);
    assert_eq!(
        EmbeddingRepo::list_tombstones(&pool, 10).await.unwrap(),
        vec![article.id]
    );

    let healthy = indexer(&pool, hashing(), index.clone());
    let report = healthy.reconcile(100).await.unwrap();
    assert_eq!(report.tombstones_cleared, 1);
    assert!(!index.contains(article.id).await);
    assert!(EmbeddingRepo::list_tombstones(&pool, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn restart_with_memory_index_rebuilds_embeddings(pool: PgPool) {
    let article = create_article(&pool, "Glossary", "vector search uses embeddings", &[]).await;
    let before = indexer(&pool, hashing(), memory_index());
    assert!(before.index_article(&article).await);

    // A fresh process starts with an empty in-memory index.
    let index = memory_index();
    let after = indexer(&pool, hashing(), index.clone());
    after.ensure_ready().await.unwrap();
    assert!(EmbeddingRepo::find(&pool, article.id).await.unwrap().is_none());

    let report = after.reconcile(100).await.unwrap();
    assert_eq!(report.reembedded, 1);
    assert!(index.contains(article.id).await);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn racing_reindexes_leave_the_newest_vector(pool: PgPool) {
    let article = create_article(&pool, "Race", "alpha", &[]).await;
    let bravo = updated(&pool, article.id, "bravo").await;
    let charlie = updated(&pool, article.id, "charlie").await;

    let index = Arc::new(LaggyIndex::new(Duration::from_millis(100)));
    let indexer = indexer(&pool, hashing(), index.clone());

    // The newest snapshot is indexed first and its upsert is acknowledged
    // late; the older snapshot arrives while it is still in flight.
    let (newest, older) = tokio::join!(indexer.index_article(&charlie), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        indexer.index_article(&bravo).await
    });
    assert!(newest && older);

    let record = EmbeddingRepo::find(&pool, article.id).await.unwrap().unwrap();
    assert_eq!(record.content_hash, charlie.content_hash);

    let expected = hashing()
        .embed(
            &embedding_text(&charlie.title, &charlie.body),
            EmbeddingPurpose::Document,
        )
        .await
        .unwrap();
    let hits = index.query(&expected, 1).await.unwrap();
    assert_eq!(hits[0].article_id, article.id);
    assert!(hits[0].score > 0.999, "stored vector is not the newest content");

    assert_eq!(indexer.reconcile(100).await.unwrap(), ReconcileReport::default());
}

async fn updated(pool: &PgPool, id: i64, body: &str) -> Article {
    let edit = UpdateArticle {
        body: Some(body.into()),
        ..Default::default()
    };
    match ArticleRepo::update(pool, id, &edit, None).await.unwrap() {
        UpdateOutcome::Updated(article) => article,
        other => panic!("unexpected update outcome: {other:?}"),
    }
}
