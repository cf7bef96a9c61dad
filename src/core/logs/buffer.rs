//! In-process memory buffer for log entries
//!
//! Absorbs high-frequency appends without a database round trip per
//! entry, and drains them into the partition store in FIFO batches. The
//! flush gate guarantees at most one flush in flight; a failed flush
//! restores its batch to the front of the queue so no entry is ever
//! silently lost. Entries appended while a flush is running stay out of
//! that flush's batch.
//!
//! On process shutdown the server makes a best-effort final flush;
//! entries still buffered at a hard kill are lost. That window is an
//! accepted operational risk of the buffered tier, as is the unbounded
//! "retry on next trigger" policy after repeated flush failures.

use crate::config::BufferConfig;
use crate::core::logs::types::{LogEntry, LogEntryDraft, LogFilter, PartitionKey};
use crate::storage::LogStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

/// Number of consecutive flush failures before logging escalates to error
const FAILURE_ESCALATION_THRESHOLD: u32 = 3;

/// Result of a single flush attempt
#[derive(Debug, Clone)]
pub struct FlushReport {
    /// Whether the attempt persisted its batch (a skip counts as success)
    pub success: bool,
    /// Number of entries persisted by this attempt
    pub flushed: usize,
    /// True when another flush was already in flight and this call no-oped
    pub skipped: bool,
    /// Error description for a failed attempt
    pub error: Option<String>,
}

impl FlushReport {
    fn flushed(count: usize) -> Self {
        Self {
            success: true,
            flushed: count,
            skipped: false,
            error: None,
        }
    }

    fn skipped() -> Self {
        Self {
            success: true,
            flushed: 0,
            skipped: true,
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            flushed: 0,
            skipped: false,
            error: Some(error),
        }
    }
}

/// Record of the most recent completed flush attempt, for the health surface
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushOutcome {
    /// When the attempt finished
    pub at: DateTime<Utc>,
    /// Whether the batch was persisted
    pub success: bool,
    /// Entries persisted by the attempt
    pub flushed: usize,
    /// Error description for a failed attempt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Size- and time-bounded in-process queue of not-yet-persisted entries
///
/// One instance per process, constructed at the composition root and
/// injected into every producer and reader; never a global.
pub struct LogBuffer {
    store: Arc<dyn LogStore>,
    max_entries: usize,
    max_age: chrono::Duration,
    queue: Mutex<VecDeque<LogEntry>>,
    /// At-most-one-flush-in-flight gate; taken with `try_lock`
    flush_gate: tokio::sync::Mutex<()>,
    /// Wakes the background flush worker when a threshold is crossed
    flush_signal: Notify,
    last_flush: Mutex<Option<FlushOutcome>>,
    consecutive_failures: AtomicU32,
}

impl LogBuffer {
    /// Create a buffer that drains into `store`
    pub fn new(store: Arc<dyn LogStore>, config: &BufferConfig) -> Self {
        Self {
            store,
            max_entries: config.max_entries,
            max_age: config.max_age(),
            queue: Mutex::new(VecDeque::new()),
            flush_gate: tokio::sync::Mutex::new(()),
            flush_signal: Notify::new(),
            last_flush: Mutex::new(None),
            consecutive_failures: AtomicU32::new(0),
        }
    }

    /// Accept an entry into the buffer
    ///
    /// Validates required fields and stamps a missing timestamp. Crossing
    /// the size or age threshold wakes the flush worker without blocking
    /// the caller; downstream storage failures never surface here. The
    /// only errors a producer sees are validation errors.
    pub fn append(&self, draft: LogEntryDraft) -> Result<LogEntry> {
        let entry = draft.into_entry(Utc::now())?;

        let should_flush = {
            let mut queue = self.queue.lock();
            queue.push_back(entry.clone());
            self.over_threshold(&queue, Utc::now())
        };

        if should_flush {
            debug!("Buffer threshold crossed, requesting flush");
            self.flush_signal.notify_one();
        }

        Ok(entry)
    }

    /// Whether the buffer currently warrants a flush
    pub fn needs_flush(&self) -> bool {
        let queue = self.queue.lock();
        !queue.is_empty() && self.over_threshold(&queue, Utc::now())
    }

    fn over_threshold(&self, queue: &VecDeque<LogEntry>, now: DateTime<Utc>) -> bool {
        if queue.len() >= self.max_entries {
            return true;
        }
        // FIFO order makes the front the oldest unflushed entry.
        queue
            .front()
            .is_some_and(|oldest| now - oldest.timestamp >= self.max_age)
    }

    /// Wait until a threshold crossing requests a flush
    pub async fn flush_requested(&self) {
        self.flush_signal.notified().await;
    }

    /// Synchronously drain the buffer into the partition store
    ///
    /// If a flush is already in flight the call is a no-op (`skipped`);
    /// the in-flight flush owns the drained batch and a second drain of
    /// the same entries can never start. On a store failure the batch is
    /// restored to the front of the queue in original order for retry on
    /// the next trigger.
    pub async fn force_flush(&self) -> FlushReport {
        let _gate = match self.flush_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                debug!("Flush already in progress, skipping");
                return FlushReport::skipped();
            }
        };

        let batch: Vec<LogEntry> = {
            let mut queue = self.queue.lock();
            queue.drain(..).collect()
        };
        if batch.is_empty() {
            return FlushReport::flushed(0);
        }

        match self.persist_batch(&batch).await {
            Ok(count) => {
                self.consecutive_failures.store(0, Ordering::Relaxed);
                self.record_outcome(FlushOutcome {
                    at: Utc::now(),
                    success: true,
                    flushed: count as usize,
                    error: None,
                });
                info!("Flushed {} log entries to partition store", count);
                FlushReport::flushed(count as usize)
            }
            Err(e) => {
                {
                    // Restore the batch ahead of anything appended while
                    // the store call was in flight, preserving FIFO.
                    let mut queue = self.queue.lock();
                    for entry in batch.into_iter().rev() {
                        queue.push_front(entry);
                    }
                }
                let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                if failures >= FAILURE_ESCALATION_THRESHOLD {
                    error!(
                        "Flush failed ({} consecutive failures), batch retained for retry: {}",
                        failures, e
                    );
                } else {
                    warn!("Flush failed, batch retained for retry: {}", e);
                }
                self.record_outcome(FlushOutcome {
                    at: Utc::now(),
                    success: false,
                    flushed: 0,
                    error: Some(e.to_string()),
                });
                FlushReport::failed(e.to_string())
            }
        }
    }

    async fn persist_batch(&self, batch: &[LogEntry]) -> Result<u64> {
        // The current or a future month's partition must exist before
        // rows with that timestamp are inserted.
        let months: BTreeSet<PartitionKey> =
            batch.iter().map(LogEntry::partition_key).collect();
        for key in months {
            self.store.ensure_partition(key).await?;
        }
        self.store.batch_insert(batch).await
    }

    fn record_outcome(&self, outcome: FlushOutcome) {
        *self.last_flush.lock() = Some(outcome);
    }

    /// Current unflushed count; safe alongside concurrent appends/flushes
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Snapshot of buffered entries matching `filter`
    ///
    /// Returns copies: the snapshot cannot be mutated by, and does not
    /// observe, concurrent appends.
    pub fn unflushed_matching(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.queue
            .lock()
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// Most recent completed flush attempt
    pub fn last_flush(&self) -> Option<FlushOutcome> {
        self.last_flush.lock().clone()
    }

    /// Consecutive failed flush attempts since the last success
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }
}
