//! # Error Types Module
//!
//! This module defines the error taxonomy of the label scanning pipeline and how
//! each failure is reported to HTTP clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned when no product name could be read from the tag
pub const PRODUCT_NAME_NOT_FOUND_MESSAGE: &str = "상품명을 찾을 수 없습니다.";

/// Errors raised while scanning a price tag
#[derive(Debug, Error)]
pub enum ScanError {
    /// The uploaded bytes are not a readable image
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    /// The preprocessed image could not be re-encoded
    #[error("Image encode error: {0}")]
    ImageEncode(String),
    /// The multipart upload was missing or unreadable
    #[error("Upload error: {0}")]
    Upload(String),
    /// The OCR service failed or answered with an error
    #[error("OCR error: {0}")]
    Ocr(String),
    /// The shopping backend failed or answered with an error
    #[error("Backend error: {0}")]
    Backend(String),
    /// OCR succeeded but no usable product name was found
    #[error("Product name not found")]
    ProductNameNotFound,
    /// A background task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ScanError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::ProductNameNotFound | ScanError::Upload(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the JSON error body
    pub fn client_message(&self) -> String {
        match self {
            ScanError::ProductNameNotFound => PRODUCT_NAME_NOT_FOUND_MESSAGE.to_string(),
            other => format!("오류 발생: {other}"),
        }
    }
}

/// JSON error body: `{"message": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Label scan failed: {self}");
        } else {
            info!("Label scan rejected: {self}");
        }

        let body = ErrorBody {
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}
