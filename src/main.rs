//! HTTP server for the tax engine.
//!
//! Loads the tax tables from `TAX_ENGINE_CONFIG` (default `./config/2024`)
//! and serves the API on `TAX_ENGINE_ADDR` (default `0.0.0.0:3000`).

use std::error::Error;

use tax_engine::api::{AppState, create_router};
use tax_engine::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/2024";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir =
        std::env::var("TAX_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = std::env::var("TAX_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        tax_year = %config.tax_year().year,
        rates_as_of = %config.tables().exchange_rates().as_of,
        "Tax tables loaded"
    );

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("tax-engine listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
