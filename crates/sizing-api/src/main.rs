//! Sizing API - hardware sizing service
//!
//! Serves workload estimation, build validation, server recommendation and
//! revenue leak scoring over HTTP.

use anyhow::{Context, Result};
use sizing_api::{api, AppState, SizingConfig};
use sizing_core::Catalog;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs, filter from RUST_LOG
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting sizing-api");

    let config = SizingConfig::load()?;

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path)
            .with_context(|| format!("failed to load catalog from {}", path.display()))?,
        None => Catalog::default(),
    };
    info!(
        skus = catalog.len(),
        window_secs = config.rate_limit_window_secs,
        "Service configured"
    );

    let state = Arc::new(AppState::new(&config, catalog));
    api::serve(&config, state).await?;

    info!("Shutdown complete");
    Ok(())
}
