//! In-memory partition store
//!
//! Used when the database is disabled and by the test suite. Mirrors the
//! PostgreSQL store's semantics, including partition bookkeeping: a batch
//! whose timestamps fall outside every existing partition is rejected
//! whole, exactly like an insert against a partitioned table with no
//! covering partition.

use crate::core::logs::types::{LogEntry, LogFilter, PartitionKey};
use crate::storage::database::store::{retention_cutoff, LogStore, StorePage};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
struct MemoryTier {
    partitions: BTreeSet<PartitionKey>,
    rows: Vec<LogEntry>,
}

/// In-memory implementation of [`LogStore`]
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    inner: RwLock<MemoryTier>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all persisted rows in insertion order
    pub fn persisted_rows(&self) -> Vec<LogEntry> {
        self.inner.read().rows.clone()
    }

    /// Snapshot of the existing partition keys, oldest first
    pub fn partition_keys(&self) -> Vec<PartitionKey> {
        self.inner.read().partitions.iter().copied().collect()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn ensure_partition(&self, key: PartitionKey) -> Result<()> {
        // BTreeSet insert is create-if-not-exists by construction.
        self.inner.write().partitions.insert(key);
        Ok(())
    }

    async fn batch_insert(&self, entries: &[LogEntry]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }
        let mut tier = self.inner.write();
        for entry in entries {
            if !tier.partitions.contains(&entry.partition_key()) {
                // Reject the whole batch: nothing below this point has
                // been applied yet, which keeps the insert atomic.
                return Err(ServiceError::Database(sea_orm::DbErr::Custom(format!(
                    "no partition of relation \"game_logs\" found for row at {}",
                    entry.timestamp
                ))));
            }
        }
        tier.rows.extend_from_slice(entries);
        Ok(entries.len() as u64)
    }

    async fn query_logs(&self, filter: &LogFilter) -> Result<StorePage> {
        let tier = self.inner.read();
        let mut matched: Vec<LogEntry> = tier
            .rows
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        let total = matched.len() as u64;
        let offset = filter.offset().min(total) as usize;
        let end = (offset + filter.limit as usize).min(matched.len());
        Ok(StorePage {
            rows: matched[offset..end].to_vec(),
            total,
        })
    }

    async fn cleanup_old_data(
        &self,
        months_to_keep: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PartitionKey>> {
        let cutoff = retention_cutoff(months_to_keep, now);
        let mut tier = self.inner.write();
        let dropped: Vec<PartitionKey> = tier
            .partitions
            .iter()
            .copied()
            .filter(|key| *key < cutoff)
            .collect();
        for key in &dropped {
            tier.partitions.remove(key);
        }
        tier.rows
            .retain(|entry| entry.partition_key() >= cutoff);
        Ok(dropped)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
