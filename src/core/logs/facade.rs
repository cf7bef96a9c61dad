//! Query facade over the buffered and persisted tiers
//!
//! A read merges the partition store's rows with the buffer's unflushed
//! snapshot so the most recent entries are visible before they are
//! durable. If the store is unavailable the facade degrades to
//! buffer-only results with a failure indicator instead of raising; its
//! consumers expect `{success, data, error}` shaped responses at this
//! boundary, not exceptions.

use crate::core::logs::buffer::LogBuffer;
use crate::core::logs::types::{LogEntry, LogFilter};
use crate::storage::LogStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// One merged, paginated page of logs plus tier observability counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQueryData {
    /// Page of entries ordered by timestamp descending
    pub records: Vec<LogEntry>,
    /// Persisted total plus matching buffered count (point-in-time)
    pub total: u64,
    /// Requested page (1-based)
    pub page: u32,
    /// Total pages at the requested limit
    pub total_pages: u64,
    /// Buffered entries matching the filter
    pub memory_logs: u64,
    /// Persisted rows matching the filter
    pub database_logs: u64,
    /// Current unflushed buffer size (unfiltered), for buffer-pressure
    /// observability
    pub buffer_size: usize,
}

/// Outcome of a merged read; `success: false` carries degraded
/// (buffer-only) data plus an error description
#[derive(Debug, Clone, Serialize)]
pub struct LogQueryOutcome {
    pub success: bool,
    pub data: LogQueryData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Unified read path across both tiers
pub struct LogQueryService {
    buffer: Arc<LogBuffer>,
    store: Arc<dyn LogStore>,
}

impl LogQueryService {
    pub fn new(buffer: Arc<LogBuffer>, store: Arc<dyn LogStore>) -> Self {
        Self { buffer, store }
    }

    /// Answer one logical "get logs" request across both tiers
    ///
    /// The store is asked for a superset (`offset + limit + buffer_size`
    /// rows) so the merge can never starve the requested page; both sets
    /// are merged, sorted by timestamp descending and sliced. The total
    /// is the persisted total plus the buffered match count; the two
    /// fetches share no snapshot, so a flush between them can shift the
    /// displayed total by a small transient amount. That drift is
    /// accepted eventual consistency, not a defect.
    pub async fn get_partition_logs(&self, filter: &LogFilter) -> LogQueryOutcome {
        if let Err(e) = filter.validate() {
            return LogQueryOutcome {
                success: false,
                data: Self::empty_page(filter, self.buffer.len()),
                error: Some(e.to_string()),
            };
        }

        let buffer_size = self.buffer.len();
        let offset = filter.offset();

        // Worst case every buffered entry sorts above the persisted rows
        // of the requested page.
        let superset = LogFilter {
            page: 1,
            limit: (offset + u64::from(filter.limit) + buffer_size as u64)
                .min(u64::from(u32::MAX)) as u32,
            ..filter.clone()
        };

        let buffered = self.buffer.unflushed_matching(filter);
        let memory_logs = buffered.len() as u64;

        match self.store.query_logs(&superset).await {
            Ok(page) => {
                debug!(
                    "Merging {} persisted rows with {} buffered entries",
                    page.rows.len(),
                    buffered.len()
                );
                let database_logs = page.total;
                let total = database_logs + memory_logs;
                let records = Self::merge_and_slice(page.rows, buffered, offset, filter.limit);
                LogQueryOutcome {
                    success: true,
                    data: LogQueryData {
                        records,
                        total,
                        page: filter.page,
                        total_pages: total_pages(total, filter.limit),
                        memory_logs,
                        database_logs,
                        buffer_size,
                    },
                    error: None,
                }
            }
            Err(e) => {
                warn!("Partition store unavailable, serving buffer-only results: {}", e);
                let total = memory_logs;
                let records = Self::merge_and_slice(Vec::new(), buffered, offset, filter.limit);
                LogQueryOutcome {
                    success: false,
                    data: LogQueryData {
                        records,
                        total,
                        page: filter.page,
                        total_pages: total_pages(total, filter.limit),
                        memory_logs,
                        database_logs: 0,
                        buffer_size,
                    },
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn merge_and_slice(
        persisted: Vec<LogEntry>,
        buffered: Vec<LogEntry>,
        offset: u64,
        limit: u32,
    ) -> Vec<LogEntry> {
        let mut merged = persisted;
        merged.extend(buffered);
        // Stable sort keeps persisted rows ahead of buffered ones at
        // equal timestamps.
        merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let offset = (offset as usize).min(merged.len());
        let end = (offset + limit as usize).min(merged.len());
        merged[offset..end].to_vec()
    }

    fn empty_page(filter: &LogFilter, buffer_size: usize) -> LogQueryData {
        LogQueryData {
            records: Vec::new(),
            total: 0,
            page: filter.page,
            total_pages: 0,
            memory_logs: 0,
            database_logs: 0,
            buffer_size,
        }
    }
}

fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}
