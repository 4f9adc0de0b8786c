//! Hourly pruning of expired and revoked refresh-token sessions.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wikisearch_db::repositories::SessionRepo;
use wikisearch_db::DbPool;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Run the cleanup loop until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Session cleanup job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match SessionRepo::purge_dead(&pool).await {
                    Ok(0) => {}
                    Ok(deleted) => tracing::info!(deleted, "Purged dead sessions"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}
