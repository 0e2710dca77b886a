//! Obesity Level Predictor - Main Entry Point
//!
//! Loads the training artifacts once, then serves the prediction form over HTTP.

use anyhow::{Context, Result};
use obesity_predictor::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    metrics::ServiceMetrics,
    models::{inference::Predictor, loader::Artifacts},
    server::{self, AppState},
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("obesity_predictor={},tower_http=info", logging.level))
    })?;

    match logging.format.as_str() {
        "json" => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var("OBESITY_CONFIG").ok();
    let config = match &config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };

    init_logging(&config.logging)?;
    info!(
        path = config_path.as_deref().unwrap_or(DEFAULT_CONFIG_PATH),
        "Configuration loaded successfully"
    );

    // Missing or corrupt artifacts are fatal
    let artifacts = Arc::new(Artifacts::load(&config.artifacts).context("Failed to load artifacts")?);

    let metrics = Arc::new(ServiceMetrics::new());
    let predictor = Predictor::new(artifacts, metrics.clone());
    info!(
        features = predictor.encoder().feature_count(),
        model = %predictor.artifacts().model.name(),
        "Predictor initialized"
    );

    let app = server::router(AppState::new(predictor));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    metrics.print_summary();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
