//! Storage layer
//!
//! The partition store is reached only through the [`LogStore`] trait so
//! the buffer and facade never depend on a concrete engine. The SeaORM
//! implementation owns the partitioned Postgres table; the memory
//! implementation backs tests and database-disabled deployments.

pub mod database;

pub use database::memory_store::MemoryLogStore;
pub use database::seaorm_store::SeaOrmLogStore;
pub use database::store::{LogStore, StorePage};

use crate::config::StorageConfig;
use crate::utils::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the partition store described by the storage configuration
///
/// Falls back to the in-memory store when the database is disabled, the
/// same degraded mode used by tests.
pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn LogStore>> {
    if config.database.enabled {
        let store = SeaOrmLogStore::new(&config.database).await?;
        store.migrate().await?;
        info!("Partition store ready (PostgreSQL)");
        Ok(Arc::new(store))
    } else {
        warn!("Database disabled; using in-memory partition store");
        Ok(Arc::new(MemoryLogStore::new()))
    }
}
