//! Dual-tier game log pipeline
//!
//! Entries are appended to an in-process memory buffer (the "hot" tier)
//! and flushed in batches into a month-partitioned relational store (the
//! "cold" tier). Reads merge both tiers behind a single facade, and a
//! maintenance runner keeps partitions ahead of the clock and applies the
//! retention window.

pub mod buffer;
pub mod facade;
pub mod maintenance;
pub mod types;

pub use buffer::{FlushOutcome, FlushReport, LogBuffer};
pub use facade::{LogQueryData, LogQueryOutcome, LogQueryService};
pub use maintenance::MaintenanceRunner;
pub use types::{LogEntry, LogEntryDraft, LogFilter, LogLevel, PartitionKey};
