//! Periodic background jobs
//!
//! Both jobs run once immediately, then on a fixed interval. Missed ticks are
//! skipped rather than bursted; a failed run is logged and retried on the next
//! tick. Jobs stop when the shutdown token is cancelled.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::ingest::{ingest_catalog, CatalogSources};
use crate::service::ReviewService;

/// Spawn the progress sync sweep
pub fn spawn_sync_sweep(
    service: Arc<ReviewService>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    info!("Starting sync sweep (interval: {}s)", period.as_secs());

    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            match service.run_sync().await {
                Ok(report) => debug!(
                    "Sync sweep: {} created, {} already present",
                    report.created, report.already_present
                ),
                Err(e) => error!("Sync sweep failed: {}", e),
            }
        }

        info!("Sync sweep stopped");
    })
}

/// Spawn periodic catalog ingestion
pub fn spawn_catalog_ingest(
    pool: SqlitePool,
    sources: CatalogSources,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    info!("Starting catalog ingestion (interval: {}s)", period.as_secs());

    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {}
            }

            if let Err(e) = ingest_catalog(&pool, &sources).await {
                error!("Catalog ingestion failed: {}", e);
            }
        }

        info!("Catalog ingestion stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use lcards_common::{MemoryStore, NewWord};

    #[tokio::test]
    async fn test_sync_sweep_runs_immediately_and_stops_on_cancel() {
        let store = Arc::new(MemoryStore::new());
        store.add_word(NewWord::new("cat", "gato", "animals")).await;
        let service = Arc::new(ReviewService::new(
            store.clone(),
            store.clone(),
            FixedOffset::east_opt(0).unwrap(),
        ));

        let shutdown = CancellationToken::new();
        let handle = spawn_sync_sweep(service, Duration::from_secs(3600), shutdown.clone());

        // First tick fires at once
        for _ in 0..50 {
            if store.progress_count().await == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.progress_count().await, 1);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweep should stop after cancel")
            .unwrap();
    }
}
