//! # OCR Module
//!
//! Text detection through the Google Cloud Vision `images:annotate` REST API.
//! The `TextRecognizer` trait is the seam the HTTP layer depends on, so the
//! pipeline can run against any recognizer.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::config::{VisionConfig, VisionCredentials};
use crate::errors::ScanError;

const TEXT_DETECTION_FEATURE: &str = "TEXT_DETECTION";

/// One text region reported by the OCR service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

/// Ordered text annotations for one image
///
/// The first annotation holds the full recognized text block; the rest are
/// per-word detections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognizedText {
    pub annotations: Vec<TextAnnotation>,
}

impl RecognizedText {
    pub fn new(annotations: Vec<TextAnnotation>) -> Self {
        Self { annotations }
    }

    /// Build a result holding only a full-text annotation
    pub fn from_full_text(text: impl Into<String>) -> Self {
        Self::new(vec![TextAnnotation {
            description: text.into(),
            locale: None,
        }])
    }

    /// The full recognized text, if anything was detected
    pub fn full_text(&self) -> Option<&str> {
        self.annotations
            .first()
            .map(|annotation| annotation.description.as_str())
    }
}

/// Anything that can turn image bytes into recognized text
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<RecognizedText, ScanError>;
}

#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    requests: Vec<AnnotateImageRequest<'a>>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest<'a> {
    image: ImageContent,
    features: Vec<Feature<'a>>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(default, rename = "textAnnotations")]
    text_annotations: Vec<TextAnnotation>,
    #[serde(default)]
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// Google Cloud Vision text detection client
pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

impl VisionClient {
    /// Create a client with explicit endpoint, credentials and timeout
    pub fn new(config: VisionConfig) -> Result<Self, ScanError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScanError::Config(format!("failed to build OCR HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn annotate_request(&self, image: &[u8]) -> reqwest::RequestBuilder {
        let body = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: TEXT_DETECTION_FEATURE,
                }],
            }],
        };

        let request = self.http.post(&self.config.endpoint).json(&body);
        match &self.config.credentials {
            VisionCredentials::ApiKey(key) => request.query(&[("key", key)]),
            VisionCredentials::AccessToken(token) => request.bearer_auth(token),
        }
    }
}

#[async_trait]
impl TextRecognizer for VisionClient {
    async fn recognize(&self, image: &[u8]) -> Result<RecognizedText, ScanError> {
        info!("Sending {} byte image to text detection", image.len());

        let response = self
            .annotate_request(image)
            .send()
            .await
            .map_err(|e| ScanError::Ocr(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Text detection returned HTTP {}: {}", status, body);
            return Err(ScanError::Ocr(format!("HTTP {status}: {body}")));
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| ScanError::Ocr(format!("invalid response: {e}")))?;

        let Some(first) = parsed.responses.into_iter().next() else {
            debug!("Text detection returned no responses");
            return Ok(RecognizedText::default());
        };

        if let Some(error) = first.error {
            return Err(ScanError::Ocr(format!(
                "{} (code {})",
                error.message, error.code
            )));
        }

        let recognized = RecognizedText::new(first.text_annotations);
        info!(
            "Text detection found {} annotations ({} characters of full text)",
            recognized.annotations.len(),
            recognized.full_text().map(|text| text.chars().count()).unwrap_or(0)
        );
        Ok(recognized)
    }
}
