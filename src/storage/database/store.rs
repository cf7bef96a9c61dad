//! Partition store trait
//!
//! One trait method is one bounded unit of work against the shared
//! connection pool; no caller holds a connection across operations.

use crate::core::logs::types::{LogEntry, LogFilter, PartitionKey};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One page of persisted rows plus the total match count
#[derive(Debug, Clone, Default)]
pub struct StorePage {
    /// Matching rows ordered by timestamp descending
    pub rows: Vec<LogEntry>,
    /// Total number of persisted rows matching the filter
    pub total: u64,
}

/// Storage primitives owned by the partition store
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Idempotently create the partition covering `key`
    ///
    /// Create-if-not-exists semantics; safe to call concurrently from
    /// multiple writers. An already-existing partition is a no-op.
    async fn ensure_partition(&self, key: PartitionKey) -> Result<()>;

    /// Insert a batch of entries in a single transaction
    ///
    /// The whole batch commits or is rejected atomically, so a failed
    /// batch can be retried without duplicate risk. Exactly-once is not
    /// guaranteed across a crash between commit and acknowledgment.
    async fn batch_insert(&self, entries: &[LogEntry]) -> Result<u64>;

    /// Filtered, paginated read over the persisted tier
    ///
    /// All filter predicates are conjunctive; rows are ordered by
    /// timestamp descending. Filters are validated at the API boundary,
    /// not here: the facade's internal superset fetch legitimately
    /// exceeds the public page-size cap.
    async fn query_logs(&self, filter: &LogFilter) -> Result<StorePage>;

    /// Drop partitions entirely older than the retention cutoff
    ///
    /// The cutoff is computed at whole-month granularity: a partition is
    /// dropped only when every row it could contain is older than
    /// `months_to_keep` months before `now`. Returns the dropped keys.
    async fn cleanup_old_data(
        &self,
        months_to_keep: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PartitionKey>>;

    /// Cheap reachability probe for the health surface
    async fn ping(&self) -> Result<()>;
}

/// Retention cutoff: partitions strictly before this key are dropped
pub fn retention_cutoff(months_to_keep: u32, now: DateTime<Utc>) -> PartitionKey {
    PartitionKey::containing(now).minus_months(months_to_keep)
}
