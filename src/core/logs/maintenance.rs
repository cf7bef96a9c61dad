//! Maintenance runner
//!
//! Entry points for the externally triggered maintenance paths (forced
//! flush, partition preparation, retention cleanup) plus the background
//! tasks that run them on a cadence.

use crate::config::RetentionConfig;
use crate::core::logs::buffer::{FlushReport, LogBuffer};
use crate::core::logs::types::PartitionKey;
use crate::storage::LogStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Flush, partition-prep and retention entry points
#[derive(Clone)]
pub struct MaintenanceRunner {
    buffer: Arc<LogBuffer>,
    store: Arc<dyn LogStore>,
    retention: RetentionConfig,
    sweep_interval: Duration,
}

impl MaintenanceRunner {
    pub fn new(
        buffer: Arc<LogBuffer>,
        store: Arc<dyn LogStore>,
        retention: RetentionConfig,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            buffer,
            store,
            retention,
            sweep_interval,
        }
    }

    /// Force a buffer flush and report how many entries were persisted
    pub async fn flush_now(&self) -> FlushReport {
        self.buffer.force_flush().await
    }

    /// Idempotently create the partitions for the current and next month
    ///
    /// Running ahead of the month boundary means inserts never race the
    /// partition that should receive them.
    pub async fn prepare_partitions(&self, now: DateTime<Utc>) -> Result<()> {
        let current = PartitionKey::containing(now);
        self.store.ensure_partition(current).await?;
        self.store.ensure_partition(current.next()).await?;
        debug!(
            "Partitions prepared through {}",
            current.next().table_name()
        );
        Ok(())
    }

    /// Drop partitions older than the retention window
    pub async fn run_retention(&self, now: DateTime<Utc>) -> Result<Vec<PartitionKey>> {
        let dropped = self
            .store
            .cleanup_old_data(self.retention.months_to_keep, now)
            .await?;
        if dropped.is_empty() {
            debug!("Retention cleanup found nothing to drop");
        } else {
            info!(
                "Retention cleanup dropped {} partition(s): {:?}",
                dropped.len(),
                dropped.iter().map(|k| k.table_name()).collect::<Vec<_>>()
            );
        }
        Ok(dropped)
    }

    /// Start the background maintenance tasks
    ///
    /// One task services flush requests (threshold notifications plus a
    /// periodic age sweep); a second runs partition prep and retention on
    /// the configured cadence. Both run for the process lifetime.
    pub fn start_background_tasks(&self) {
        let runner = self.clone();
        tokio::spawn(async move {
            let mut sweep = tokio::time::interval(runner.sweep_interval);
            loop {
                tokio::select! {
                    _ = runner.buffer.flush_requested() => {}
                    _ = sweep.tick() => {}
                }
                if runner.buffer.needs_flush() {
                    let report = runner.buffer.force_flush().await;
                    if !report.success {
                        warn!(
                            "Background flush failed, will retry on next trigger: {}",
                            report.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                }
            }
        });

        let runner = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(runner.retention.maintenance_interval());
            loop {
                interval.tick().await;
                let now = Utc::now();
                if let Err(e) = runner.prepare_partitions(now).await {
                    warn!("Partition preparation failed: {}", e);
                }
                if let Err(e) = runner.run_retention(now).await {
                    warn!("Retention cleanup failed: {}", e);
                }
            }
        });
    }
}
