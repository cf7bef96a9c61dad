//! Memory-buffer and retention configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Memory-buffer configuration
///
/// The buffer never silently exceeds `max_entries`: crossing it, or
/// holding an entry older than `max_age_secs`, triggers an automatic
/// flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Flush when this many entries are buffered
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Flush when the oldest buffered entry reaches this age
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// How often the background sweep re-checks the age threshold
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_age_secs: default_max_age_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl BufferConfig {
    /// Validate buffer parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }
        if self.max_age_secs == 0 {
            return Err("max_age_secs must be greater than 0".to_string());
        }
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Age threshold as a duration
    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.max_age_secs as i64)
    }

    /// Sweep interval as a duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Partition retention configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Number of whole months a partition is kept before being dropped
    #[serde(default = "default_months_to_keep")]
    pub months_to_keep: u32,
    /// Cadence of the partition-prep + cleanup job
    #[serde(default = "default_maintenance_interval_secs")]
    pub maintenance_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            months_to_keep: default_months_to_keep(),
            maintenance_interval_secs: default_maintenance_interval_secs(),
        }
    }
}

impl RetentionConfig {
    /// Validate retention parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.months_to_keep == 0 {
            return Err("months_to_keep must be greater than 0".to_string());
        }
        if self.maintenance_interval_secs == 0 {
            return Err("maintenance_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Maintenance cadence as a duration
    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_secs)
    }
}

fn default_max_entries() -> usize {
    1000
}

fn default_max_age_secs() -> u64 {
    60
}

fn default_sweep_interval_secs() -> u64 {
    10
}

fn default_months_to_keep() -> u32 {
    6
}

fn default_maintenance_interval_secs() -> u64 {
    86_400
}
