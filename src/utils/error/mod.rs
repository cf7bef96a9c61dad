//! Error types for the log service
//!
//! Internal components return rich result values rather than panicking;
//! callers are expected to check the result instead of relying on
//! exception-style propagation.

use thiserror::Error;

/// Result type alias for the log service
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Main error type for the log service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Validation errors (malformed entry or filter, rejected at the boundary)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unauthorized errors (bad or missing operational credential)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The partition store cannot be reached or timed out
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Whether a failed store operation is worth retrying on the next trigger
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::Database(_) | ServiceError::StoreUnavailable(_) | ServiceError::Timeout(_)
        )
    }
}
