//! Common test utilities for gamelog-rs
//!
//! Shared test infrastructure:
//! - Entry and filter factories with sensible defaults
//! - Instrumented [`gamelog_rs::LogStore`] wrappers for failure and
//!   slowness injection


pub use fixtures::LogFactory;
pub use stores::{FlakyStore, SlowStore};
