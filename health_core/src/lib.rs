//! Health endpoint library: serves an aggregated probe result over HTTP with
//! authorization-aware detail disclosure, cache-safe headers and orchestrator-friendly
//! status codes.

pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod status;

pub use config::AppConfig;
pub use context::{auth_result, set_auth_result, with_auth_result};
pub use error::{HealthError, Result};
pub use handlers::{
    disable_response_cache, new_handler, start_periodic_checks, stop_periodic_checks, Handler,
    HandlerBuilder, HealthCheckHandler, JsonEncoder, PeriodicChecks, ResultEncoder,
    CONTENT_TYPE_JSON,
};
pub use health::{Checker, FilesystemCheck, FnCheck, HealthCheck, HealthChecker, TcpCheck};
pub use middleware::{
    bearer_auth, custom_auth, full_details_on_query_param, request_logger, trace_layer,
    HealthService, Middleware,
};
pub use status::{map_http_status, AggregatedCheckStatus, AvailabilityStatus, CheckResult};

use axum::{routing::get_service, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Middleware chain described by the configuration, outermost first.
pub fn middlewares_from_config(config: &AppConfig) -> Vec<Middleware> {
    let mut middlewares = vec![request_logger()];

    if !config.auth.bearer_token.is_empty() {
        middlewares.push(bearer_auth(
            config.auth.bearer_token.clone(),
            config.auth.reject_unauthenticated,
        ));
    }

    if !config.auth.details_query_param.is_empty() {
        middlewares.push(full_details_on_query_param(
            config.auth.details_query_param.clone(),
        ));
    }

    middlewares
}

pub fn create_handler(checker: Arc<dyn Checker>, config: &AppConfig) -> Handler {
    new_handler(checker, middlewares_from_config(config))
}

pub fn create_app(handler: Handler, config: &AppConfig) -> Router {
    Router::new()
        .route(&config.health.route, get_service(handler))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(trace_layer())
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
