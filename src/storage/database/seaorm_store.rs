//! PostgreSQL partition store
//!
//! Owns the physical `game_logs` table and its monthly range partitions.
//! Row traffic goes through SeaORM entities; partition DDL and catalog
//! introspection use raw statements because the schema builder cannot
//! express them.

use crate::config::DatabaseConfig;
use crate::core::logs::types::{LogEntry, LogFilter, PartitionKey};
use crate::storage::database::entities::game_log;
use crate::storage::database::migration::Migrator;
use crate::storage::database::store::{retention_cutoff, LogStore, StorePage};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Statement,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// SeaORM-backed implementation of [`LogStore`]
pub struct SeaOrmLogStore {
    db: DatabaseConnection,
}

impl SeaOrmLogStore {
    /// Connect to the database described by `config`
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(3600))
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(opt).await.map_err(ServiceError::Database)?;
        info!("Database connection established");
        Ok(Self { db })
    }

    /// Run database migrations (parent table + indexes)
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        Migrator::up(&self.db, None).await.map_err(|e| {
            warn!("Migration failed: {}", e);
            ServiceError::Database(e)
        })?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get the underlying database connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Keys of the monthly partitions attached to the parent table
    async fn list_partitions(&self) -> Result<Vec<PartitionKey>> {
        let stmt = Statement::from_string(
            DbBackend::Postgres,
            "SELECT inhrelid::regclass::text AS partition_name \
             FROM pg_inherits WHERE inhparent = 'game_logs'::regclass",
        );
        let rows = self
            .db
            .query_all(stmt)
            .await
            .map_err(ServiceError::Database)?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("", "partition_name")
                .map_err(ServiceError::Database)?;
            match PartitionKey::parse_table_name(&name) {
                Some(key) => keys.push(key),
                // Foreign attachments are left alone rather than guessed at.
                None => warn!("Ignoring unrecognized partition: {}", name),
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn build_condition(filter: &LogFilter) -> Condition {
        let mut cond = Condition::all();
        if let Some(log_type) = &filter.log_type {
            cond = cond.add(game_log::Column::LogType.eq(log_type.clone()));
        }
        if let Some(level) = filter.level {
            cond = cond.add(game_log::Column::Level.eq(level.as_str()));
        }
        if let Some(resource) = &filter.resource {
            cond = cond.add(game_log::Column::Resource.eq(resource.clone()));
        }
        if let Some(user_id) = filter.user_id {
            cond = cond.add(game_log::Column::UserId.eq(user_id));
        }
        if let Some(needle) = &filter.message_contains {
            cond = cond.add(game_log::Column::Message.contains(needle.clone()));
        }
        if let Some(start) = filter.start {
            cond = cond.add(game_log::Column::Timestamp.gte(DateTimeWithTimeZone::from(start)));
        }
        if let Some(end) = filter.end {
            cond = cond.add(game_log::Column::Timestamp.lte(DateTimeWithTimeZone::from(end)));
        }
        cond
    }
}

#[async_trait]
impl LogStore for SeaOrmLogStore {
    async fn ensure_partition(&self, key: PartitionKey) -> Result<()> {
        let (start, end) = key.bounds();
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} PARTITION OF game_logs \
             FOR VALUES FROM ('{start}') TO ('{end}')",
            table = key.table_name(),
            start = start.format("%Y-%m-%d %H:%M:%S%:z"),
            end = end.format("%Y-%m-%d %H:%M:%S%:z"),
        );
        match self.db.execute_unprepared(&sql).await {
            Ok(_) => {
                debug!("Partition {} ready", key.table_name());
                Ok(())
            }
            // Two writers can still race past IF NOT EXISTS; the loser's
            // duplicate error is the same no-op.
            Err(e) if e.to_string().contains("already exists") => Ok(()),
            Err(e) => Err(ServiceError::Database(e)),
        }
    }

    async fn batch_insert(&self, entries: &[LogEntry]) -> Result<u64> {
        if entries.is_empty() {
            return Ok(0);
        }

        let models: Vec<game_log::ActiveModel> =
            entries.iter().map(game_log::ActiveModel::from).collect();

        // One transaction: the batch commits or is rejected whole.
        let txn = self.db.begin().await.map_err(ServiceError::Database)?;
        game_log::Entity::insert_many(models)
            .exec(&txn)
            .await
            .map_err(ServiceError::Database)?;
        txn.commit().await.map_err(ServiceError::Database)?;

        debug!("Inserted batch of {} log entries", entries.len());
        Ok(entries.len() as u64)
    }

    async fn query_logs(&self, filter: &LogFilter) -> Result<StorePage> {
        let cond = Self::build_condition(filter);

        let total = game_log::Entity::find()
            .filter(cond.clone())
            .count(&self.db)
            .await
            .map_err(ServiceError::Database)?;

        let models = game_log::Entity::find()
            .filter(cond)
            .order_by_desc(game_log::Column::Timestamp)
            .order_by_desc(game_log::Column::Id)
            .offset(filter.offset())
            .limit(u64::from(filter.limit))
            .all(&self.db)
            .await
            .map_err(ServiceError::Database)?;

        let rows = models
            .into_iter()
            .map(LogEntry::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(StorePage { rows, total })
    }

    async fn cleanup_old_data(
        &self,
        months_to_keep: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<PartitionKey>> {
        let cutoff = retention_cutoff(months_to_keep, now);
        let mut dropped = Vec::new();

        for key in self.list_partitions().await? {
            if key >= cutoff {
                continue;
            }
            // Dropping the partition is a cheap bulk delete of the whole
            // month. IF EXISTS keeps a concurrent drop idempotent.
            let sql = format!("DROP TABLE IF EXISTS {}", key.table_name());
            self.db
                .execute_unprepared(&sql)
                .await
                .map_err(ServiceError::Database)?;
            info!("Dropped expired log partition {}", key.table_name());
            dropped.push(key);
        }

        Ok(dropped)
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(ServiceError::Database)
    }
}
