//! Buffer flush semantics
//!
//! Covers the flush guarantees: nothing is lost on a store failure,
//! FIFO order survives a retry, at most one flush runs at a time, and
//! entries appended mid-flush stay out of the in-flight batch.

#[cfg(test)]
mod tests {
    use crate::common::{FlakyStore, LogFactory, SlowStore};
    use gamelog_rs::config::BufferConfig;
    use gamelog_rs::{LogBuffer, MemoryLogStore};
    use std::sync::Arc;
    use std::time::Duration;

    fn buffer(store: Arc<dyn gamelog_rs::LogStore>) -> Arc<LogBuffer> {
        Arc::new(LogBuffer::new(store, &BufferConfig::default()))
    }

    /// Burst of appends followed by one flush: everything lands in the
    /// store in append order.
    #[tokio::test]
    async fn test_burst_then_flush_preserves_order() {
        let store = Arc::new(MemoryLogStore::new());
        let buffer = buffer(store.clone());

        let mut ids = Vec::new();
        for i in 0..20 {
            let mut draft = LogFactory::draft("ITEM_USE");
            draft.message = format!("event {}", i);
            ids.push(buffer.append(draft).unwrap().id);
        }

        let report = buffer.force_flush().await;
        assert!(report.success);
        assert_eq!(report.flushed, 20);
        assert!(buffer.is_empty());

        let persisted: Vec<_> = store.persisted_rows().iter().map(|e| e.id).collect();
        assert_eq!(persisted, ids);
    }

    /// A failed flush keeps the batch; the retry persists everything in
    /// the original order, exactly once.
    #[tokio::test]
    async fn test_failed_flush_retains_batch_for_retry() {
        let store = Arc::new(FlakyStore::new());
        let buffer = buffer(store.clone());

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(buffer.append(LogFactory::draft("LOGIN")).unwrap().id);
        }

        store.set_outage(true);
        let report = buffer.force_flush().await;
        assert!(!report.success);
        assert!(report.error.is_some());
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.consecutive_failures(), 1);
        assert!(store.persisted_rows().is_empty());

        // More traffic arrives while the store is down.
        ids.push(buffer.append(LogFactory::draft("LOGIN")).unwrap().id);

        store.set_outage(false);
        let report = buffer.force_flush().await;
        assert!(report.success);
        assert_eq!(report.flushed, 4);
        assert_eq!(buffer.consecutive_failures(), 0);

        // Original append order, no duplicates.
        let persisted: Vec<_> = store.persisted_rows().iter().map(|e| e.id).collect();
        assert_eq!(persisted, ids);
    }

    /// Repeated failures accumulate on the health counter until a flush
    /// succeeds.
    #[tokio::test]
    async fn test_failure_counter_resets_on_success() {
        let store = Arc::new(FlakyStore::new());
        let buffer = buffer(store.clone());
        buffer.append(LogFactory::draft("LOGIN")).unwrap();

        store.set_outage(true);
        for expected in 1..=3 {
            let report = buffer.force_flush().await;
            assert!(!report.success);
            assert_eq!(buffer.consecutive_failures(), expected);
        }
        assert!(!buffer.last_flush().unwrap().success);

        store.set_outage(false);
        assert!(buffer.force_flush().await.success);
        assert_eq!(buffer.consecutive_failures(), 0);
        assert!(buffer.last_flush().unwrap().success);
    }

    /// An entry older than the age threshold warrants a flush even when
    /// the buffer is far below its size limit.
    #[tokio::test]
    async fn test_age_threshold_requests_flush() {
        let store = Arc::new(MemoryLogStore::new());
        let config = BufferConfig {
            max_entries: 100,
            max_age_secs: 30,
            ..Default::default()
        };
        let buffer = LogBuffer::new(store.clone(), &config);

        // A fresh entry is below both thresholds.
        buffer.append(LogFactory::draft("LOGIN")).unwrap();
        assert!(!buffer.needs_flush());

        // A buffer whose oldest entry has aged past the limit is due.
        let stale_buffer = LogBuffer::new(store.clone(), &config);
        let old = chrono::Utc::now() - chrono::Duration::seconds(60);
        stale_buffer
            .append(LogFactory::draft_at("CHAT", old))
            .unwrap();
        assert!(stale_buffer.needs_flush());

        // The sweep path drains it like any other flush.
        let report = stale_buffer.force_flush().await;
        assert!(report.success);
        assert_eq!(report.flushed, 1);
        assert!(!stale_buffer.needs_flush());
    }

    /// A second flush while one is in flight is a skipped no-op; the
    /// batch is persisted exactly once.
    #[tokio::test]
    async fn test_concurrent_flush_is_skipped() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(200)));
        let buffer = buffer(store.clone());
        buffer.append(LogFactory::draft("LOGIN")).unwrap();
        buffer.append(LogFactory::draft("LOGOUT")).unwrap();

        let first = {
            let buffer = buffer.clone();
            tokio::spawn(async move { buffer.force_flush().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = buffer.force_flush().await;
        assert!(second.skipped);
        assert!(second.success);
        assert_eq!(second.flushed, 0);

        let first = first.await.unwrap();
        assert!(first.success);
        assert_eq!(first.flushed, 2);
        assert_eq!(store.persisted_rows().len(), 2);
    }

    /// Entries appended while a flush is running are not part of that
    /// flush's batch and survive in the buffer.
    #[tokio::test]
    async fn test_appends_during_flush_stay_buffered() {
        let store = Arc::new(SlowStore::new(Duration::from_millis(200)));
        let buffer = buffer(store.clone());
        buffer.append(LogFactory::draft("LOGIN")).unwrap();
        buffer.append(LogFactory::draft("LOGOUT")).unwrap();

        let flush = {
            let buffer = buffer.clone();
            tokio::spawn(async move { buffer.force_flush().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let late = buffer.append(LogFactory::draft("CHAT")).unwrap();

        let report = flush.await.unwrap();
        assert!(report.success);
        assert_eq!(report.flushed, 2);

        assert_eq!(buffer.len(), 1);
        let remaining = buffer.unflushed_matching(&LogFactory::any());
        assert_eq!(remaining[0].id, late.id);
    }
}
