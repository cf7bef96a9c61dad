//! Log ingestion and query endpoints
//!
//! Ingestion is an internal API used by application code: a successful
//! response means "accepted into the buffer", not "persisted". Queries go
//! through the facade and always return the `{success, data, error}`
//! envelope, degrading to buffer-only data when the store is down.

use crate::core::logs::types::{LogEntryDraft, LogFilter, LogLevel, DEFAULT_PAGE_LIMIT};
use crate::server::routes::ApiResponse;
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Configure log routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/logs")
            .route("", web::post().to(ingest_log))
            .route("", web::get().to(query_logs)),
    );
}

/// Acknowledgment for an accepted entry
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestAck {
    /// Id assigned to the accepted entry
    id: Uuid,
    /// Unflushed buffer size after the append
    buffer_size: usize,
}

/// Accept a log entry into the memory buffer
///
/// Returns `202 Accepted` on success; the only client-visible failures
/// are validation errors. Storage problems are handled downstream by the
/// flush retry path and never surface here.
async fn ingest_log(
    state: web::Data<AppState>,
    payload: web::Json<LogEntryDraft>,
) -> HttpResponse {
    match state.buffer.append(payload.into_inner()) {
        Ok(entry) => {
            debug!("Accepted log entry {} into buffer", entry.id);
            HttpResponse::Accepted().json(ApiResponse::success(IngestAck {
                id: entry.id,
                buffer_size: state.buffer.len(),
            }))
        }
        Err(e) => HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())),
    }
}

/// Query-string filter for the merged log view
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogQueryParams {
    #[serde(rename = "type")]
    log_type: Option<String>,
    level: Option<LogLevel>,
    message: Option<String>,
    resource: Option<String>,
    user_id: Option<i64>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl LogQueryParams {
    fn into_filter(self) -> LogFilter {
        LogFilter {
            log_type: self.log_type,
            level: self.level,
            resource: self.resource,
            user_id: self.user_id,
            message_contains: self.message,
            start: self.start_date,
            end: self.end_date,
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }
}

/// Merged, paginated log view across both tiers
async fn query_logs(
    state: web::Data<AppState>,
    params: web::Query<LogQueryParams>,
) -> HttpResponse {
    let filter = params.into_inner().into_filter();
    if let Err(e) = filter.validate() {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string()));
    }

    let outcome = state.queries.get_partition_logs(&filter).await;
    let response = if outcome.success {
        ApiResponse::success(outcome.data)
    } else {
        ApiResponse::degraded(
            outcome.data,
            outcome
                .error
                .unwrap_or_else(|| "partition store unavailable".to_string()),
        )
    };
    // Degraded results are still HTTP 200: callers inspect the success
    // flag, and a partial page beats a blocked one.
    HttpResponse::Ok().json(response)
}
