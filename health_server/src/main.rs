//! Main entry point for the health endpoint server

use anyhow::{Context, Result};
use health_core::{
    create_app, create_handler, run_server, start_periodic_checks, stop_periodic_checks,
    AppConfig, Checker, HealthChecker,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load().context("Failed to load configuration")?;

    info!("Configuration loaded successfully");
    info!("Server will bind to: {}", config.bind_address());

    let addr: SocketAddr = config.bind_address().parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let engine = HealthChecker::from_config(&config);
    info!(
        "Registered {} health checks ({})",
        engine.check_count(),
        if engine.is_periodic() { "periodic" } else { "on demand" }
    );

    let checker: Arc<dyn Checker> = Arc::new(engine);
    let handler = create_handler(checker, &config);

    if config.health.manual_start {
        warn!("Manual start configured, periodic health checks stay idle until started");
    } else {
        start_periodic_checks(&handler);
    }

    let app = create_app(handler.clone(), &config);

    info!("Serving health endpoint at {}", config.health.route);
    run_server(app, addr).await?;

    stop_periodic_checks(&handler);

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let default_level = if cfg!(debug_assertions) {
                "debug"
            } else {
                "info"
            };

            format!(
                "{}={level},health_core={level},tower_http=debug,axum=debug",
                env!("CARGO_CRATE_NAME").replace('-', "_"),
                level = default_level
            ).into()
        });

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let is_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.pretty())
            .init();
    }
}
