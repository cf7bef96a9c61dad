//! # gamelog-rs
//!
//! Buffered game-log pipeline for a game server: a size- and age-bounded
//! in-memory buffer in front of a month-partitioned PostgreSQL table,
//! with a merged query facade across both tiers and cron-triggered
//! maintenance (flush, partition preparation, retention).
//!
//! ## Components
//!
//! - **Memory buffer**: absorbs high-frequency appends; drains in FIFO
//!   batches with at most one flush in flight, restoring the batch on a
//!   store failure so no entry is silently lost.
//! - **Partition store**: one native `PARTITION BY RANGE` child table per
//!   calendar month; batch inserts, filtered and paginated reads, and
//!   whole-partition drops for retention.
//! - **Query facade**: merges unflushed and persisted entries into one
//!   timestamp-descending page, degrading to buffer-only data when the
//!   database is unreachable.
//! - **Maintenance**: background flush/sweep tasks plus `x-api-key`
//!   guarded cron endpoints.
//!
//! ## Running the service
//!
//! ```rust,no_run
//! use gamelog_rs::{Config, server::HttpServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/service.yaml").await?;
//!     let server = HttpServer::new(&config).await?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{Result, ServiceError};

pub use core::logs::{
    FlushOutcome, FlushReport, LogBuffer, LogEntry, LogEntryDraft, LogFilter, LogLevel,
    LogQueryService, MaintenanceRunner, PartitionKey,
};
pub use storage::{LogStore, MemoryLogStore, SeaOrmLogStore, StorePage};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
