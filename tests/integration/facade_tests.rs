//! Merged query facade
//!
//! Covers the merged read path: newest-first ordering across both tiers,
//! filters applied identically to buffered and persisted entries,
//! pagination over the merged stream, and buffer-only degraded mode when
//! the store is down.

#[cfg(test)]
mod tests {
    use crate::common::{FlakyStore, LogFactory};
    use chrono::{Duration, Utc};
    use gamelog_rs::config::BufferConfig;
    use gamelog_rs::core::logs::types::MAX_PAGE_LIMIT;
    use gamelog_rs::{
        LogBuffer, LogFilter, LogLevel, LogQueryService, LogStore, MemoryLogStore, PartitionKey,
    };
    use std::sync::Arc;

    async fn seed_persisted(
        store: &dyn LogStore,
        entries: &[gamelog_rs::LogEntry],
    ) {
        for entry in entries {
            store.ensure_partition(entry.partition_key()).await.unwrap();
        }
        store.batch_insert(entries).await.unwrap();
    }

    fn service(store: Arc<dyn LogStore>) -> (Arc<LogBuffer>, LogQueryService) {
        let buffer = Arc::new(LogBuffer::new(store.clone(), &BufferConfig::default()));
        let service = LogQueryService::new(buffer.clone(), store);
        (buffer, service)
    }

    /// Recent buffered entries interleave with older persisted rows into
    /// one timestamp-descending page.
    #[tokio::test]
    async fn test_merges_tiers_newest_first() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (buffer, service) = service(store.clone());

        let base = Utc::now() - Duration::hours(1);
        let t = |m: i64| base + Duration::minutes(m);

        seed_persisted(
            store.as_ref(),
            &[
                LogFactory::entry_at("LOGIN", t(0)),
                LogFactory::entry_at("LOGIN", t(20)),
            ],
        )
        .await;
        buffer.append(LogFactory::draft_at("CHAT", t(10))).unwrap();
        buffer.append(LogFactory::draft_at("CHAT", t(30))).unwrap();

        let outcome = service.get_partition_logs(&LogFactory::any()).await;
        assert!(outcome.success);

        let data = outcome.data;
        assert_eq!(data.total, 4);
        assert_eq!(data.memory_logs, 2);
        assert_eq!(data.database_logs, 2);
        assert_eq!(data.buffer_size, 2);

        let times: Vec<_> = data.records.iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![t(30), t(20), t(10), t(0)]);
    }

    /// Pagination slices the merged stream, not either tier alone.
    #[tokio::test]
    async fn test_pagination_spans_tiers() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (buffer, service) = service(store.clone());

        let base = Utc::now() - Duration::hours(1);
        let t = |m: i64| base + Duration::minutes(m);

        seed_persisted(
            store.as_ref(),
            &[
                LogFactory::entry_at("LOGIN", t(0)),
                LogFactory::entry_at("LOGIN", t(2)),
                LogFactory::entry_at("LOGIN", t(4)),
            ],
        )
        .await;
        buffer.append(LogFactory::draft_at("CHAT", t(1))).unwrap();
        buffer.append(LogFactory::draft_at("CHAT", t(3))).unwrap();

        let filter = LogFilter {
            page: 2,
            limit: 2,
            ..LogFilter::new()
        };
        let outcome = service.get_partition_logs(&filter).await;
        assert!(outcome.success);

        let data = outcome.data;
        assert_eq!(data.total, 5);
        assert_eq!(data.total_pages, 3);
        // Merged desc order is t4 t3 t2 t1 t0; page 2 holds t2 and t1.
        let times: Vec<_> = data.records.iter().map(|e| e.timestamp).collect();
        assert_eq!(times, vec![t(2), t(1)]);
    }

    /// The same filter predicates apply to both tiers.
    #[tokio::test]
    async fn test_filters_apply_to_both_tiers() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (buffer, service) = service(store.clone());

        let now = Utc::now();
        seed_persisted(
            store.as_ref(),
            &[
                LogFactory::entry_at("LOGIN", now - Duration::minutes(5)),
                LogFactory::entry_at("CHAT", now - Duration::minutes(4)),
            ],
        )
        .await;
        buffer.append(LogFactory::draft("LOGIN")).unwrap();
        buffer.append(LogFactory::draft("CHAT")).unwrap();

        let outcome = service.get_partition_logs(&LogFactory::by_type("LOGIN")).await;
        assert!(outcome.success);

        let data = outcome.data;
        assert_eq!(data.total, 2);
        assert_eq!(data.memory_logs, 1);
        assert_eq!(data.database_logs, 1);
        assert!(data.records.iter().all(|e| e.log_type == "LOGIN"));
    }

    #[tokio::test]
    async fn test_user_and_level_filters() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (buffer, service) = service(store.clone());
        store
            .ensure_partition(PartitionKey::containing(Utc::now()))
            .await
            .unwrap();

        buffer
            .append(LogFactory::draft_for_user("COMBAT", LogLevel::Error, 7))
            .unwrap();
        buffer
            .append(LogFactory::draft_for_user("COMBAT", LogLevel::Info, 7))
            .unwrap();
        buffer
            .append(LogFactory::draft_for_user("COMBAT", LogLevel::Error, 8))
            .unwrap();

        let filter = LogFilter {
            level: Some(LogLevel::Error),
            user_id: Some(7),
            ..LogFilter::new()
        };
        let outcome = service.get_partition_logs(&filter).await;
        assert_eq!(outcome.data.records.len(), 1);
        assert_eq!(outcome.data.records[0].user_id, Some(7));
        assert_eq!(outcome.data.records[0].level, LogLevel::Error);
    }

    /// A full-size page plus buffered entries pushes the internal
    /// superset fetch past the public page-size cap; the store must
    /// still answer and the merge must stay healthy.
    #[tokio::test]
    async fn test_max_limit_page_with_buffered_entries() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (buffer, service) = service(store.clone());

        let now = Utc::now();
        seed_persisted(
            store.as_ref(),
            &[LogFactory::entry_at("LOGIN", now - Duration::minutes(1))],
        )
        .await;
        buffer.append(LogFactory::draft("CHAT")).unwrap();

        let filter = LogFilter {
            limit: MAX_PAGE_LIMIT,
            ..LogFilter::new()
        };
        let outcome = service.get_partition_logs(&filter).await;

        assert!(outcome.success, "unexpected error: {:?}", outcome.error);
        assert_eq!(outcome.data.total, 2);
        assert_eq!(outcome.data.database_logs, 1);
        assert_eq!(outcome.data.memory_logs, 1);
        assert_eq!(outcome.data.records.len(), 2);
    }

    /// A page deep past the public cap still reaches the store instead
    /// of degrading to buffer-only results.
    #[tokio::test]
    async fn test_deep_page_reaches_store() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (buffer, service) = service(store.clone());

        let now = Utc::now();
        seed_persisted(
            store.as_ref(),
            &[
                LogFactory::entry_at("LOGIN", now - Duration::minutes(2)),
                LogFactory::entry_at("LOGIN", now - Duration::minutes(1)),
            ],
        )
        .await;
        buffer.append(LogFactory::draft("CHAT")).unwrap();

        // Offset 1000: well past the data, and past MAX_PAGE_LIMIT rows.
        let filter = LogFilter {
            page: 21,
            limit: 50,
            ..LogFilter::new()
        };
        let outcome = service.get_partition_logs(&filter).await;

        assert!(outcome.success, "unexpected error: {:?}", outcome.error);
        assert_eq!(outcome.data.database_logs, 2);
        assert_eq!(outcome.data.total, 3);
        assert!(outcome.data.records.is_empty());
    }

    /// With the store down the facade serves buffered entries and flags
    /// the response as degraded instead of failing.
    #[tokio::test]
    async fn test_degraded_buffer_only_mode() {
        let store = Arc::new(FlakyStore::new());
        let (buffer, service) = service(store.clone());

        buffer.append(LogFactory::draft("LOGIN")).unwrap();
        buffer.append(LogFactory::draft("CHAT")).unwrap();

        store.set_outage(true);
        let outcome = service.get_partition_logs(&LogFactory::any()).await;

        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        let data = outcome.data;
        assert_eq!(data.records.len(), 2);
        assert_eq!(data.memory_logs, 2);
        assert_eq!(data.database_logs, 0);
        assert_eq!(data.total, 2);
    }

    /// An invalid filter is rejected before either tier is consulted.
    #[tokio::test]
    async fn test_invalid_filter_rejected() {
        let store: Arc<dyn LogStore> = Arc::new(MemoryLogStore::new());
        let (_buffer, service) = service(store);

        let filter = LogFilter {
            page: 0,
            ..LogFilter::new()
        };
        let outcome = service.get_partition_logs(&filter).await;
        assert!(!outcome.success);
        assert!(outcome.error.is_some());
        assert!(outcome.data.records.is_empty());
    }
}
