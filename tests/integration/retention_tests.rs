//! Retention cleanup
//!
//! A partition is dropped only when every row it could contain is older
//! than the retention window; the boundary month is always retained.

#[cfg(test)]
mod tests {
    use crate::common::LogFactory;
    use chrono::{TimeZone, Utc};
    use gamelog_rs::config::{BufferConfig, RetentionConfig};
    use gamelog_rs::{
        LogBuffer, LogStore, MaintenanceRunner, MemoryLogStore, PartitionKey,
    };
    use std::sync::Arc;
    use std::time::Duration;

    async fn seed_partitions(store: &MemoryLogStore, keys: &[PartitionKey]) {
        for key in keys {
            store.ensure_partition(*key).await.unwrap();
        }
    }

    /// Six-month window, partitions spanning nine months: only those
    /// entirely older than the window are dropped.
    #[tokio::test]
    async fn test_drops_only_expired_partitions() {
        let store = MemoryLogStore::new();
        let keys: Vec<_> = (1..=9)
            .map(|month| PartitionKey { year: 2026, month })
            .collect();
        seed_partitions(&store, &keys).await;

        // Rows in an expired and a retained month.
        let old = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        let recent = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        store
            .batch_insert(&[
                LogFactory::entry_at("LOGIN", old),
                LogFactory::entry_at("LOGIN", recent),
            ])
            .await
            .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 9, 10, 12, 0, 0).unwrap();
        let dropped = store.cleanup_old_data(6, now).await.unwrap();

        // Cutoff is 2026-03: January and February go, March through
        // September stay.
        assert_eq!(
            dropped,
            vec![
                PartitionKey { year: 2026, month: 1 },
                PartitionKey { year: 2026, month: 2 },
            ]
        );
        assert_eq!(store.partition_keys().len(), 7);

        let remaining = store.persisted_rows();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].timestamp, recent);
    }

    /// The boundary month itself is retained: data exactly
    /// `months_to_keep` months old is not yet expired.
    #[tokio::test]
    async fn test_boundary_month_retained() {
        let store = MemoryLogStore::new();
        let boundary = PartitionKey { year: 2026, month: 3 };
        seed_partitions(&store, &[boundary]).await;

        let now = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let dropped = store.cleanup_old_data(6, now).await.unwrap();

        assert!(dropped.is_empty());
        assert_eq!(store.partition_keys(), vec![boundary]);
    }

    /// Cleanup with nothing expired is a successful no-op.
    #[tokio::test]
    async fn test_cleanup_with_nothing_to_drop() {
        let store = MemoryLogStore::new();
        let now = Utc::now();
        seed_partitions(&store, &[PartitionKey::containing(now)]).await;

        let dropped = store.cleanup_old_data(6, now).await.unwrap();
        assert!(dropped.is_empty());
    }

    /// The maintenance runner applies the configured window end to end.
    #[tokio::test]
    async fn test_runner_applies_configured_window() {
        let store = Arc::new(MemoryLogStore::new());
        seed_partitions(
            &store,
            &[
                PartitionKey { year: 2025, month: 1 },
                PartitionKey { year: 2026, month: 8 },
            ],
        )
        .await;

        let buffer = Arc::new(LogBuffer::new(store.clone(), &BufferConfig::default()));
        let runner = MaintenanceRunner::new(
            buffer,
            store.clone(),
            RetentionConfig {
                months_to_keep: 6,
                ..Default::default()
            },
            Duration::from_secs(10),
        );

        let now = Utc.with_ymd_and_hms(2026, 8, 23, 0, 0, 0).unwrap();
        let dropped = runner.run_retention(now).await.unwrap();

        assert_eq!(dropped, vec![PartitionKey { year: 2025, month: 1 }]);
        assert_eq!(
            store.partition_keys(),
            vec![PartitionKey { year: 2026, month: 8 }]
        );
    }
}
