//! Hit predictor - browser front end for a trained hit/flop classifier
//!
//! Loads the exported pipeline once at startup and serves the input form
//! and JSON API. A missing or broken artifact leaves the service running
//! with prediction disabled.

use anyhow::Result;
use hit_predictor::config::{LogFormat, ServerConfig};
use hit_predictor::{api, AppState};
use predictor_lib::predictor::PredictionAdapter;
use predictor_lib::{EventLogger, HealthRegistry, PredictorMetrics};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load()?;
    init_tracing(config.log_format);

    info!("Starting hit-predictor");

    let logger = EventLogger::new(&config.instance_name);
    logger.log_startup(SERVICE_VERSION, &config.model_path);

    let adapter = Arc::new(PredictionAdapter::new(config.model_path.clone()));
    let app_state = Arc::new(AppState::new(
        adapter,
        HealthRegistry::new(),
        PredictorMetrics::new(),
        logger.clone(),
    ));

    app_state.initialize().await;

    api::serve(&config.listen_addr(), app_state, shutdown_signal()).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
