//! Application setup and initialization
//!
//! Startup order: validate configuration, start tracing, build the blob store and
//! service clients, then the router. Any failure aborts startup.

pub mod routes;
pub mod server;
pub mod services;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use docsum_core::Config;
use docsum_infra::LogFormat;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    let log_format: LogFormat = config
        .log_format()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    docsum_infra::init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        config = ?config,
        "Configuration loaded and validated successfully"
    );

    // Setup storage
    let store = storage::setup_storage(&config).await?;

    // Initialize service clients and the upload pipeline
    let state = services::initialize_services(&config, store).await?;

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
