//! Maintenance trigger credentials
//!
//! The flush/maintenance endpoints are invoked by a periodic job, not by
//! end users. Callers authenticate with a shared secret in the
//! `x-api-key` header: the cron key is always accepted, the debug key
//! only outside production. Empty keys fail closed.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Shared-secret credentials for the cron trigger endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MaintenanceAuthConfig {
    /// Key presented by the automated scheduler
    #[serde(default)]
    pub cron_api_key: String,
    /// Optional key for interactive/debug callers; ignored in production
    #[serde(default)]
    pub debug_api_key: Option<String>,
}

impl MaintenanceAuthConfig {
    /// Check a presented key against the configured secrets
    pub fn authorize(&self, presented: &str, production: bool) -> bool {
        if presented.is_empty() {
            return false;
        }
        if !self.cron_api_key.is_empty() && presented == self.cron_api_key {
            return true;
        }
        if !production {
            if let Some(debug_key) = &self.debug_api_key {
                return !debug_key.is_empty() && presented == debug_key;
            }
        }
        false
    }
}

/// Warn about configurations that disable the maintenance triggers
pub fn warn_insecure_config(config: &MaintenanceAuthConfig) {
    if config.cron_api_key.is_empty() {
        warn!("maintenance.cron_api_key is empty; cron trigger endpoints will reject all callers");
    }
}
