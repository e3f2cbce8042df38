//! Acadmix PDF proxy server
//!
//! Loads configuration, sets up logging, and starts the HTTP service.

use acadmix_pdf_proxy::{PdfProxyServer, ProxyConfig};
use anyhow::Context;
use std::env;
use std::path::Path;
use tracing::{error, info};

/// Default configuration file, used when no path is given on the command line
const DEFAULT_CONFIG_PATH: &str = "acadmix_proxy.yaml";

/// Main entry point
///
/// # Usage
/// ```bash
/// # Start with defaults (reads acadmix_proxy.yaml if present)
/// cargo run
///
/// # Start with an explicit config
/// cargo run -- /path/to/config.yaml
/// ```
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    info!("Starting Acadmix PDF proxy");

    let config = load_config().context("Failed to load configuration")?;

    info!("Configuration:");
    info!("  - Listen address: {}", config.listen_address);
    info!("  - Origin host marker: {}", config.origin_host);
    info!("  - Fetch timeout: {}s", config.fetch_timeout_secs);
    info!("  - Cache max-age: {}s", config.cache_max_age_secs);

    let server = PdfProxyServer::new(config).context("Failed to create proxy server")?;

    server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Load configuration from the CLI argument, the default file, or defaults
fn load_config() -> anyhow::Result<ProxyConfig> {
    if let Some(path) = env::args().nth(1) {
        info!("Loading configuration from: {}", path);
        return Ok(ProxyConfig::from_file(&path)?);
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        info!("Loading configuration from: {}", DEFAULT_CONFIG_PATH);
        return Ok(ProxyConfig::from_file(DEFAULT_CONFIG_PATH)?);
    }

    info!("No configuration file found, using defaults");
    Ok(ProxyConfig::default())
}
