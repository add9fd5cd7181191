//! # Scanner Module
//!
//! Runs one uploaded photo through the whole pipeline:
//! preprocessing, text detection, field extraction and the optional forward to
//! the shopping backend. Nothing is shared between requests except the clients.

use std::sync::Arc;

use log::{debug, info};
use serde_json::Value;

use crate::backend::ProductLookup;
use crate::errors::ScanError;
use crate::label_types::StructuredPayload;
use crate::ocr::TextRecognizer;
use crate::preprocessing::ImagePreprocessor;
use crate::text_processing::extract_fields;

/// Result of a successful scan
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The backend's JSON answer, relayed verbatim
    Forwarded(Value),
    /// The extracted payload, when forwarding is disabled
    Extracted(StructuredPayload),
}

#[derive(Clone)]
pub struct LabelScanner {
    preprocessor: ImagePreprocessor,
    recognizer: Arc<dyn TextRecognizer>,
    lookup: Option<Arc<dyn ProductLookup>>,
}

impl LabelScanner {
    /// Create a scanner; pass `None` as `lookup` to skip forwarding
    pub fn new(
        recognizer: Arc<dyn TextRecognizer>,
        lookup: Option<Arc<dyn ProductLookup>>,
    ) -> Self {
        Self {
            preprocessor: ImagePreprocessor::new(),
            recognizer,
            lookup,
        }
    }

    /// Read the fields of a price tag photo
    ///
    /// # Errors
    ///
    /// `ScanError::ProductNameNotFound` when no product name could be resolved;
    /// image and OCR failures otherwise.
    #[tracing::instrument(skip_all, fields(image_bytes = image.len()))]
    pub async fn extract(&self, image: Vec<u8>) -> Result<StructuredPayload, ScanError> {
        let preprocessor = self.preprocessor.clone();
        let png = tokio::task::spawn_blocking(move || preprocessor.preprocess(&image))
            .await
            .map_err(|e| ScanError::Task(format!("image preprocessing did not complete: {e}")))??;

        let recognized = self.recognizer.recognize(&png).await?;
        debug!("Recognized text: {:?}", recognized.full_text());

        let record = extract_fields(recognized.full_text());
        if record.product_name.is_none() {
            return Err(ScanError::ProductNameNotFound);
        }

        let payload = record.to_payload();
        info!("Extracted payload: {:?}", payload);
        Ok(payload)
    }

    /// Extract the fields and forward them to the backend when one is configured
    pub async fn scan(&self, image: Vec<u8>) -> Result<ScanOutcome, ScanError> {
        let payload = self.extract(image).await?;

        match &self.lookup {
            Some(lookup) => lookup.search(&payload).await.map(ScanOutcome::Forwarded),
            None => Ok(ScanOutcome::Extracted(payload)),
        }
    }
}
