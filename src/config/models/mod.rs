//! Configuration models

pub mod logs;
pub mod maintenance;
pub mod server;
pub mod storage;

pub use logs::{BufferConfig, RetentionConfig};
pub use maintenance::MaintenanceAuthConfig;
pub use server::ServerConfig;
pub use storage::{DatabaseConfig, StorageConfig};

use serde::{Deserialize, Serialize};

/// Top-level service configuration (YAML document root)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Memory-buffer configuration
    #[serde(default)]
    pub buffer: BufferConfig,
    /// Partition retention configuration
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Maintenance trigger credentials
    #[serde(default)]
    pub maintenance: MaintenanceAuthConfig,
}

impl ServiceConfig {
    /// Apply `GAMELOG_*` environment overrides on top of file/default values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("GAMELOG_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("GAMELOG_SERVER_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(environment) = std::env::var("GAMELOG_ENVIRONMENT") {
            self.server.environment = environment;
        }
        if let Ok(url) = std::env::var("GAMELOG_DATABASE_URL") {
            self.storage.database.url = url;
            self.storage.database.enabled = true;
        }
        if let Ok(key) = std::env::var("GAMELOG_CRON_API_KEY") {
            self.maintenance.cron_api_key = key;
        }
        if let Ok(key) = std::env::var("GAMELOG_DEBUG_API_KEY") {
            self.maintenance.debug_api_key = Some(key);
        }
    }
}

pub(crate) fn default_max_connections() -> u32 {
    10
}

pub(crate) fn default_connection_timeout() -> u64 {
    5
}
