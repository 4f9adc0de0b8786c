//! Periodic index reconciliation.
//!
//! Re-embeds articles whose vectors are missing or stale and retries vector
//! deletions that failed. The interval bounds how long a failed index step
//! can leave search without an article's semantic signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use wikisearch_pipeline::Indexer;

/// Run the reconciliation loop until `cancel` is triggered.
///
/// The first pass runs immediately, which also backfills an in-memory index
/// after a restart.
pub async fn run(
    indexer: Arc<Indexer>,
    every: Duration,
    batch_size: i64,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = every.as_secs(),
        batch_size,
        "Index reconciliation job started"
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Index reconciliation job stopping");
                break;
            }
            _ = interval.tick() => {
                match indexer.reconcile(batch_size).await {
                    // Non-empty passes are logged at info by the indexer.
                    Ok(report) => {
                        tracing::debug!(scanned = report.scanned, "Index reconciliation tick");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Index reconciliation failed");
                    }
                }
            }
        }
    }
}
