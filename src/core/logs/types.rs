//! Log entry, filter and partition-key types

use crate::utils::error::{Result, ServiceError};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size for log queries
pub const DEFAULT_PAGE_LIMIT: u32 = 50;
/// Maximum page size for log queries
pub const MAX_PAGE_LIMIT: u32 = 1000;

const MAX_TYPE_LEN: usize = 64;
const MAX_RESOURCE_LEN: usize = 128;

/// Severity level of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Wire/database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(ServiceError::Validation(format!(
                "Unknown log level: {}",
                other
            ))),
        }
    }
}

/// A single game log record
///
/// Immutable once created: entries are only ever inserted and eventually
/// deleted wholesale by retention cleanup, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Unique entry id, assigned at append time
    pub id: Uuid,
    /// Event time; defaults to append time when the producer omits it
    pub timestamp: DateTime<Utc>,
    /// Severity level
    pub level: LogLevel,
    /// Free-form category, e.g. "ITEM_USE" or "LOGIN"
    #[serde(rename = "type")]
    pub log_type: String,
    /// Human-readable message
    pub message: String,
    /// Optional subsystem tag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Arbitrary structured payload, opaque to the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Optional player reference for user-scoped queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl LogEntry {
    /// Partition key covering this entry's timestamp
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey::containing(self.timestamp)
    }
}

/// Producer-facing ingest payload
///
/// The synchronous return of an append only means "accepted into the
/// buffer", not "persisted".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntryDraft {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    pub level: LogLevel,
    #[serde(rename = "type")]
    pub log_type: String,
    pub message: String,
    #[serde(default)]
    pub resource: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogEntryDraft {
    /// Validate required fields and stamp the entry
    pub fn into_entry(self, now: DateTime<Utc>) -> Result<LogEntry> {
        if self.log_type.trim().is_empty() {
            return Err(ServiceError::Validation("type is required".to_string()));
        }
        if self.log_type.len() > MAX_TYPE_LEN {
            return Err(ServiceError::Validation(format!(
                "type exceeds {} characters",
                MAX_TYPE_LEN
            )));
        }
        if self.message.trim().is_empty() {
            return Err(ServiceError::Validation("message is required".to_string()));
        }
        if let Some(resource) = &self.resource {
            if resource.len() > MAX_RESOURCE_LEN {
                return Err(ServiceError::Validation(format!(
                    "resource exceeds {} characters",
                    MAX_RESOURCE_LEN
                )));
            }
        }

        Ok(LogEntry {
            id: Uuid::new_v4(),
            timestamp: self.timestamp.unwrap_or(now),
            level: self.level,
            log_type: self.log_type,
            message: self.message,
            resource: self.resource,
            metadata: self.metadata,
            user_id: self.user_id,
        })
    }
}

/// Filter applied identically against the buffered and persisted tiers
///
/// All predicates are conjunctive. Timestamp bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub log_type: Option<String>,
    pub level: Option<LogLevel>,
    pub resource: Option<String>,
    pub user_id: Option<i64>,
    pub message_contains: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// 1-based page number; 0 is rejected by `validate`
    pub page: u32,
    /// Page size; bounded by `MAX_PAGE_LIMIT`
    pub limit: u32,
}

impl LogFilter {
    /// Filter with default pagination and no predicates
    pub fn new() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            ..Default::default()
        }
    }

    /// Fail fast on filter shapes that are programmer errors
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(ServiceError::Validation(
                "page must be greater than 0".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(ServiceError::Validation(
                "limit must be greater than 0".to_string(),
            ));
        }
        if self.limit > MAX_PAGE_LIMIT {
            return Err(ServiceError::Validation(format!(
                "limit cannot exceed {}",
                MAX_PAGE_LIMIT
            )));
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ServiceError::Validation(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Row offset for the requested page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Apply every predicate (pagination excluded) to an entry
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(log_type) = &self.log_type {
            if &entry.log_type != log_type {
                return false;
            }
        }
        if let Some(level) = self.level {
            if entry.level != level {
                return false;
            }
        }
        if let Some(resource) = &self.resource {
            if entry.resource.as_deref() != Some(resource.as_str()) {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if entry.user_id != Some(user_id) {
                return false;
            }
        }
        if let Some(needle) = &self.message_contains {
            if !entry.message.contains(needle.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }
}

/// Key of a monthly time-range partition
///
/// Partitions are non-overlapping and contiguous; ordering follows the
/// calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    pub year: i32,
    /// 1-based calendar month
    pub month: u32,
}

impl PartitionKey {
    /// Key of the partition covering `ts`
    pub fn containing(ts: DateTime<Utc>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// The following calendar month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Key `months` whole months earlier
    pub fn minus_months(&self, months: u32) -> Self {
        let total = self.year as i64 * 12 + (self.month as i64 - 1) - months as i64;
        Self {
            year: total.div_euclid(12) as i32,
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }

    /// Half-open time range `[start, end)` covered by this partition
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc
            .with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        let next = self.next();
        let end = Utc
            .with_ymd_and_hms(next.year, next.month, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        (start, end)
    }

    /// Physical table name, e.g. `game_logs_y2026m08`
    pub fn table_name(&self) -> String {
        format!("game_logs_y{:04}m{:02}", self.year, self.month)
    }

    /// Parse a physical table name back into a key
    pub fn parse_table_name(name: &str) -> Option<Self> {
        let suffix = name.strip_prefix("game_logs_y")?;
        let (year, month) = suffix.split_once('m')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        let key = Self {
            year: year.parse().ok()?,
            month: month.parse().ok()?,
        };
        (1..=12).contains(&key.month).then_some(key)
    }
}

impl std::fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
