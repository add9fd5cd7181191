//! # Backend Module
//!
//! Forwards the extracted payload to the shopping backend and relays its JSON answer.

use async_trait::async_trait;
use log::{info, warn};
use serde_json::Value;

use crate::config::BackendConfig;
use crate::errors::ScanError;
use crate::label_types::StructuredPayload;

/// Path appended to the backend base URL
pub const SHOPPING_SEARCH_PATH: &str = "/api/shopping/search";

/// A product search service that accepts the structured payload
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn search(&self, payload: &StructuredPayload) -> Result<Value, ScanError>;
}

/// HTTP client for the shopping backend
pub struct BackendClient {
    http: reqwest::Client,
    search_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, ScanError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::Config(format!("failed to build backend HTTP client: {e}")))?;

        let search_url = format!(
            "{}{}",
            config.base_url.trim_end_matches('/'),
            SHOPPING_SEARCH_PATH
        );

        Ok(Self { http, search_url })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl ProductLookup for BackendClient {
    async fn search(&self, payload: &StructuredPayload) -> Result<Value, ScanError> {
        info!("Forwarding payload to {}: {:?}", self.search_url, payload);

        let response = self
            .http
            .post(&self.search_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ScanError::Backend(format!("request failed: {e}")))?;

        let response = response.error_for_status().map_err(|e| {
            warn!("Backend rejected payload: {}", e);
            ScanError::Backend(e.to_string())
        })?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ScanError::Backend(format!("invalid response: {e}")))
    }
}
