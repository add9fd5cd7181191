//! # Scan Label Example
//!
//! Reads a price tag photo from disk, runs it through preprocessing and text
//! detection, and prints the extracted fields without contacting the shopping
//! backend.
//!
//! ```text
//! GOOGLE_VISION_API_KEY=... cargo run --example scan_label -- tag.jpg
//! ```

use std::sync::Arc;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use pricetag::config::AppConfig;
use pricetag::errors::{ScanError, PRODUCT_NAME_NOT_FOUND_MESSAGE};
use pricetag::ocr::VisionClient;
use pricetag::scanner::LabelScanner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: scan_label <image-path>");
    };

    let image = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
    let config = AppConfig::from_env().context("failed to load configuration")?;

    let recognizer = Arc::new(VisionClient::new(config.vision)?);
    let scanner = LabelScanner::new(recognizer, None);

    println!("🏷️  {path}");
    match scanner.extract(image).await {
        Ok(payload) => {
            println!("상품명: {}", payload.title);
            println!("가격: {}", payload.price);
            println!("용량: {}", payload.volume);
            println!("브랜드: {}", payload.brand);
            println!("\n{}", serde_json::to_string_pretty(&payload)?);
        }
        Err(ScanError::ProductNameNotFound) => println!("{PRODUCT_NAME_NOT_FOUND_MESSAGE}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
