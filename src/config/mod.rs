//! Configuration management for the log service
//!
//! This module handles loading, validation, and management of all service
//! configuration.

pub mod models;

pub use models::*;

use crate::utils::error::{Result, ServiceError};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the log service
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,
}

impl Config {
    /// Load configuration from a YAML file, then apply env overrides
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::Config(format!("Failed to read config file: {}", e)))?;

        let mut service: ServiceConfig = serde_yaml::from_str(&content)
            .map_err(|e| ServiceError::Config(format!("Failed to parse config: {}", e)))?;
        service.apply_env_overrides();

        let config = Self { service };
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Build configuration from defaults plus environment variables
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let mut service = ServiceConfig::default();
        service.apply_env_overrides();

        let config = Self { service };
        config.validate()?;
        Ok(config)
    }

    /// Get server configuration
    pub fn server(&self) -> &ServerConfig {
        &self.service.server
    }

    /// Get storage configuration
    pub fn storage(&self) -> &StorageConfig {
        &self.service.storage
    }

    /// Get memory-buffer configuration
    pub fn buffer(&self) -> &BufferConfig {
        &self.service.buffer
    }

    /// Get retention configuration
    pub fn retention(&self) -> &RetentionConfig {
        &self.service.retention
    }

    /// Get maintenance trigger credentials
    pub fn maintenance(&self) -> &MaintenanceAuthConfig {
        &self.service.maintenance
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.service
            .server
            .validate()
            .map_err(|e| ServiceError::Config(format!("Server config error: {}", e)))?;
        self.service
            .buffer
            .validate()
            .map_err(|e| ServiceError::Config(format!("Buffer config error: {}", e)))?;
        self.service
            .retention
            .validate()
            .map_err(|e| ServiceError::Config(format!("Retention config error: {}", e)))?;

        models::maintenance::warn_insecure_config(&self.service.maintenance);

        debug!("Configuration validation completed");
        Ok(())
    }
}
