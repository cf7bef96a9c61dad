use crate::core::logs::types::{LogEntry, LogLevel};
use crate::utils::error::ServiceError;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Game log database model
///
/// Maps the partitioned parent table; rows land in the monthly partition
/// covering their timestamp. The primary key is `(timestamp, id)` because
/// the partition key must be part of the key.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game_logs")]
pub struct Model {
    /// Entry id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Event timestamp (partition key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub timestamp: DateTimeWithTimeZone,

    /// Severity level ("DEBUG" | "INFO" | "WARN" | "ERROR")
    pub level: String,

    /// Free-form category, e.g. "ITEM_USE"
    pub log_type: String,

    /// Human-readable message
    pub message: String,

    /// Optional subsystem tag
    pub resource: Option<String>,

    /// Opaque structured payload
    pub metadata: Option<Json>,

    /// Optional player reference
    pub user_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LogEntry> for ActiveModel {
    fn from(entry: &LogEntry) -> Self {
        use sea_orm::ActiveValue::Set;
        Self {
            id: Set(entry.id),
            timestamp: Set(entry.timestamp.into()),
            level: Set(entry.level.as_str().to_string()),
            log_type: Set(entry.log_type.clone()),
            message: Set(entry.message.clone()),
            resource: Set(entry.resource.clone()),
            metadata: Set(entry.metadata.clone()),
            user_id: Set(entry.user_id),
        }
    }
}

impl TryFrom<Model> for LogEntry {
    type Error = ServiceError;

    fn try_from(model: Model) -> std::result::Result<LogEntry, ServiceError> {
        Ok(LogEntry {
            id: model.id,
            timestamp: model.timestamp.with_timezone(&chrono::Utc),
            level: model.level.parse::<LogLevel>()?,
            log_type: model.log_type,
            message: model.message,
            resource: model.resource,
            metadata: model.metadata,
            user_id: model.user_id,
        })
    }
}
