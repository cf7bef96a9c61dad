//! HTTP server core implementation
//!
//! This module provides the HttpServer struct and its core methods.

use crate::config::{Config, ServerConfig};
use crate::core::logs::{LogBuffer, LogQueryService, MaintenanceRunner};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{Result, ServiceError};
use actix_cors::Cors;
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// HTTP server
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Creating HTTP server");

        let store = crate::storage::build_store(config.storage()).await?;
        let buffer = Arc::new(LogBuffer::new(store.clone(), config.buffer()));
        let queries = LogQueryService::new(buffer.clone(), store.clone());
        let maintenance = MaintenanceRunner::new(
            buffer.clone(),
            store.clone(),
            config.retention().clone(),
            config.buffer().sweep_interval(),
        );

        let state = AppState::new(config.clone(), buffer, store, queries, maintenance);

        Ok(Self {
            config: config.server().clone(),
            state,
        })
    }

    /// Create the Actix-web application
    fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(Cors::default())
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "gamelog-rs")))
            .configure(routes::health::configure_routes)
            .configure(routes::logs::configure_routes)
            .configure(routes::maintenance::configure_routes)
    }

    /// Start the HTTP server
    ///
    /// Runs until the server is stopped, then makes a best-effort final
    /// flush so entries accepted shortly before shutdown reach the store.
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let workers = self.config.workers;

        // Partitions for the current and next month should exist before
        // the first flush; a failure here is retried by the background
        // maintenance task.
        if let Err(e) = self.state.maintenance.prepare_partitions(Utc::now()).await {
            warn!("Startup partition preparation failed: {}", e);
        }
        self.state.maintenance.start_background_tasks();

        info!("Starting HTTP server on {}", bind_addr);

        // Kept outside the app factory so the final flush can run after
        // the server loop exits.
        let buffer = self.state.buffer.clone();
        let state = web::Data::new(self.state);

        let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()))
            .bind(&bind_addr)
            .map_err(|e| {
                ServiceError::Config(format!("Failed to bind to {}: {}", bind_addr, e))
            })?;
        if workers > 0 {
            server = server.workers(workers);
        }

        info!("HTTP server listening on {}", bind_addr);

        server
            .run()
            .await
            .map_err(|e| ServiceError::Internal(format!("Server error: {}", e)))?;

        info!("HTTP server stopped, flushing remaining buffered entries");
        let report = buffer.force_flush().await;
        if !report.success {
            warn!(
                "Final flush failed, {} buffered entries not persisted: {}",
                buffer.len(),
                report.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
