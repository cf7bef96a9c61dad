//! Health check endpoint

use crate::core::logs::FlushOutcome;
use crate::server::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;

/// Configure health check routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferHealth {
    size: usize,
    consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_flush: Option<FlushOutcome>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreHealth {
    reachable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    buffer: BufferHealth,
    store: StoreHealth,
}

/// Liveness plus a coarse flush-pipeline view
///
/// Reports `degraded` (still HTTP 200) when the store is unreachable or
/// flushes have been failing; load balancers keep routing while operators
/// see the broken tier.
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let reachable = state.store.ping().await.is_ok();
    let consecutive_failures = state.buffer.consecutive_failures();
    let status = if reachable && consecutive_failures == 0 {
        "healthy"
    } else {
        "degraded"
    };

    HttpResponse::Ok().json(HealthStatus {
        status,
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        buffer: BufferHealth {
            size: state.buffer.len(),
            consecutive_failures,
            last_flush: state.buffer.last_flush(),
        },
        store: StoreHealth { reachable },
    })
}
