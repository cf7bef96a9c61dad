//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::logs::{LogBuffer, LogQueryService, MaintenanceRunner};
use crate::storage::LogStore;
use std::sync::Arc;

/// HTTP server state shared across handlers
///
/// The buffer is the process-wide single instance: constructed once here
/// at the composition root and injected into every caller that appends
/// or reads, never reached through a global.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// Memory buffer (hot tier)
    pub buffer: Arc<LogBuffer>,
    /// Partition store (cold tier)
    pub store: Arc<dyn LogStore>,
    /// Merged read path across both tiers
    pub queries: Arc<LogQueryService>,
    /// Flush/partition/retention entry points
    pub maintenance: Arc<MaintenanceRunner>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(
        config: Config,
        buffer: Arc<LogBuffer>,
        store: Arc<dyn LogStore>,
        queries: LogQueryService,
        maintenance: MaintenanceRunner,
    ) -> Self {
        Self {
            config: Arc::new(config),
            buffer,
            store,
            queries: Arc::new(queries),
            maintenance: Arc::new(maintenance),
        }
    }

    /// Get service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
