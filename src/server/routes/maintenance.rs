//! Cron-triggered maintenance endpoints
//!
//! These are not user-facing: callers are the periodic scheduler (or an
//! operator poking the same paths), authenticated with a shared secret in
//! the `x-api-key` header. Authorization is checked before the buffer or
//! store is touched.

use crate::server::state::AppState;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

/// Configure maintenance routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/cron")
            .route("/flush-logs", web::post().to(flush_logs))
            .route("/maintenance", web::post().to(run_maintenance)),
    );
}

fn authorized(req: &HttpRequest, state: &AppState) -> bool {
    let presented = req
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    state
        .config()
        .maintenance()
        .authorize(presented, state.config().server().is_production())
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "success": false,
        "error": "Invalid or missing x-api-key header"
    }))
}

/// Force a buffer flush
///
/// A flush already in flight makes this a successful no-op with a
/// `flushedCount` of zero.
async fn flush_logs(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if !authorized(&req, &state) {
        warn!("Rejected flush trigger with bad credentials");
        return unauthorized();
    }

    let report = state.maintenance.flush_now().await;
    if report.success {
        let message = if report.skipped {
            "Flush already in progress".to_string()
        } else {
            format!("Flushed {} log entries", report.flushed)
        };
        info!("Cron flush trigger: {}", message);
        HttpResponse::Ok().json(json!({
            "success": true,
            "message": message,
            "flushedCount": report.flushed,
        }))
    } else {
        HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": report.error.unwrap_or_else(|| "Flush failed".to_string()),
            "flushedCount": 0,
        }))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MaintenanceSummary {
    success: bool,
    flushed_count: usize,
    partitions_prepared: bool,
    dropped_partitions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

/// Run the full maintenance cycle: flush, partition prep, retention
///
/// Each step runs even if an earlier one failed; the summary carries all
/// step errors so one bad step cannot mask the others.
async fn run_maintenance(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if !authorized(&req, &state) {
        warn!("Rejected maintenance trigger with bad credentials");
        return unauthorized();
    }

    let now = Utc::now();
    let mut errors = Vec::new();

    let flush = state.maintenance.flush_now().await;
    if !flush.success {
        errors.push(format!(
            "flush: {}",
            flush.error.as_deref().unwrap_or("unknown error")
        ));
    }

    let partitions_prepared = match state.maintenance.prepare_partitions(now).await {
        Ok(()) => true,
        Err(e) => {
            errors.push(format!("partitions: {}", e));
            false
        }
    };

    let dropped_partitions = match state.maintenance.run_retention(now).await {
        Ok(dropped) => dropped.iter().map(|k| k.table_name()).collect(),
        Err(e) => {
            errors.push(format!("retention: {}", e));
            Vec::new()
        }
    };

    let summary = MaintenanceSummary {
        success: errors.is_empty(),
        flushed_count: flush.flushed,
        partitions_prepared,
        dropped_partitions,
        errors,
    };
    if summary.success {
        HttpResponse::Ok().json(summary)
    } else {
        HttpResponse::InternalServerError().json(summary)
    }
}
