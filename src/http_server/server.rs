//! # HTTP Server
//!
//! Combines the data and observability routers behind CORS and request
//! tracing middleware.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::data_routes::{data_routes, AppState};
use super::observability_routes::observability_routes;
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::table::TableStore;

/// HTTP server for the table store
pub struct HttpServer {
    config: HttpServerConfig,
    state: Arc<AppState>,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(store: Arc<TableStore>) -> Self {
        Self::with_config(HttpServerConfig::default(), store)
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, store: Arc<TableStore>) -> Self {
        let state =
            Arc::new(AppState::new(store).with_default_per_page(config.default_per_page));
        let router = Self::build_router(&config, Arc::clone(&state));
        Self {
            config,
            state,
            router,
        }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(data_routes(Arc::clone(&state)))
            .merge(observability_routes(state))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Shared handler state (store and counters)
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server, serving until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address '{}': {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(
            Event::ServerListening,
            &[
                ("addr", addr.to_string().as_str()),
                ("rows", self.state.store.len().to_string().as_str()),
            ],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
    log_event(Event::ShutdownStart);
}
