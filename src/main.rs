use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pricetag::backend::{BackendClient, ProductLookup};
use pricetag::config::{AppConfig, LogFormat};
use pricetag::ocr::VisionClient;
use pricetag::scanner::LabelScanner;
use pricetag::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    init_logging(config.server.log_format);

    info!("Starting price tag scanner");
    info!(
        "OCR endpoint: {}, backend: {} (forwarding {})",
        config.vision.endpoint,
        config.backend.base_url,
        if config.backend.forwarding { "enabled" } else { "disabled" }
    );

    let recognizer = Arc::new(VisionClient::new(config.vision.clone())?);

    let lookup: Option<Arc<dyn ProductLookup>> = if config.backend.forwarding {
        Some(Arc::new(BackendClient::new(&config.backend)?))
    } else {
        None
    };

    let scanner = LabelScanner::new(recognizer, lookup);
    server::serve(&config.server, scanner).await
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}
