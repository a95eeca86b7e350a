//! Proctor API - Main entry point.

use anyhow::Result;
use proctor_common::config::Config;
use proctor_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Proctor API v{}", env!("CARGO_PKG_VERSION"));

    proctor_api::start_server(&config).await
}
