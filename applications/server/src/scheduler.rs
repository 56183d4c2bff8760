//! Periodic scan scheduling
//!
//! The scan engine does not self-schedule; this scheduler triggers it on an
//! interval, passing the persisted per-root watermark (the start time of
//! the last successful scan). Concurrent scans of the same root are not
//! supported, so a trigger that arrives while a scan is running is skipped.

use crate::error::Result;
use chime_scanner::{ScanCounters, ScanError, Scanner};
use chime_storage::SqliteCatalog;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct Scheduler {
    pool: SqlitePool,
    scanner: Arc<Scanner<SqliteCatalog>>,
    interval: Duration,
    scanning: AtomicBool,
}

impl Scheduler {
    pub fn new(pool: SqlitePool, scanner: Arc<Scanner<SqliteCatalog>>, interval: Duration) -> Self {
        Self {
            pool,
            scanner,
            interval,
            scanning: AtomicBool::new(false),
        }
    }

    /// Run the trigger loop until shutdown is requested.
    ///
    /// The first scan fires immediately; later ones on the interval.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    tracing::info!("Scheduler stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.trigger(&shutdown).await;
                }
            }
        }
    }

    /// Trigger one scan cycle, skipping if a scan is already in flight.
    pub async fn trigger(&self, cancel: &CancellationToken) {
        if self.scanning.swap(true, Ordering::SeqCst) {
            tracing::debug!("Scan already running; skipping trigger");
            return;
        }

        if let Err(e) = self.scan_once(cancel, false).await {
            tracing::error!("Scan cycle failed: {}", e);
        }

        self.scanning.store(false, Ordering::SeqCst);
    }

    /// Run a single scan against the persisted watermark.
    ///
    /// With `full` set, the watermark is ignored and every directory on
    /// disk is reconciled. The watermark is advanced to this scan's start
    /// time only on success, so an aborted run is retried in full.
    pub async fn scan_once(
        &self,
        cancel: &CancellationToken,
        full: bool,
    ) -> Result<ScanCounters> {
        let root = self.scanner.root().to_string_lossy().into_owned();
        let started = Utc::now();
        let watermark = if full {
            DateTime::<Utc>::UNIX_EPOCH
        } else {
            chime_storage::scan_state::last_scan_at(&self.pool, &root)
                .await?
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
        };

        match self.scanner.scan(cancel, watermark).await {
            Ok(counters) => {
                chime_storage::scan_state::set_last_scan_at(&self.pool, &root, started).await?;
                tracing::info!(
                    root,
                    added = counters.added,
                    updated = counters.updated,
                    deleted = counters.deleted,
                    "Scan cycle complete"
                );
                Ok(counters)
            }
            Err(ScanError::Cancelled) => {
                tracing::info!(root, "Scan interrupted; will converge on the next cycle");
                Ok(ScanCounters::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
