//! # HTTP Server Module
//!
//! The axum router exposing the label scanning API.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, error, info};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{CorsConfig, ServerConfig};
use crate::errors::ScanError;
use crate::scanner::{LabelScanner, ScanOutcome};

pub const ROOT_PATH: &str = "/";
pub const HEALTHZ_PATH: &str = "/healthz";
pub const ANALYZE_PATH: &str = "/analyze/";

const ROOT_MESSAGE: &str = "상품 이미지 분석 API.";
const UPLOAD_FIELD: &str = "file";
const CORS_MAX_AGE: Duration = Duration::from_secs(600);

/// Build the API router with CORS, request tracing and the upload limit applied
pub fn build_router(scanner: LabelScanner, config: &ServerConfig) -> Result<Router, ScanError> {
    let router = Router::new()
        .route(ROOT_PATH, get(root))
        .route(HEALTHZ_PATH, get(healthz))
        .route(ANALYZE_PATH, post(analyze))
        .with_state(scanner)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(build_cors_layer(&config.cors)?)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, scanner: LabelScanner) -> Result<()> {
    let router = build_router(scanner, config)?;
    let addr = format!("{}:{}", config.host, config.port);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Label scanning API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Label scanning API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn build_cors_layer(config: &CorsConfig) -> Result<CorsLayer, ScanError> {
    match config {
        CorsConfig::Any => Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .max_age(CORS_MAX_AGE)),
        CorsConfig::Origins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .map(|origin| {
                    HeaderValue::from_str(origin).map_err(|e| {
                        ScanError::Config(format!("CORS origin `{origin}` is invalid: {e}"))
                    })
                })
                .collect::<Result<_, _>>()?;

            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::list([Method::GET, Method::POST, Method::OPTIONS]))
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
                .max_age(CORS_MAX_AGE))
        }
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": ROOT_MESSAGE }))
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn analyze(
    State(scanner): State<LabelScanner>,
    multipart: Multipart,
) -> Result<Response, ScanError> {
    let image = read_upload(multipart).await?;
    info!("Received {} byte label photo", image.len());

    let response = match scanner.scan(image).await? {
        ScanOutcome::Forwarded(answer) => Json(answer).into_response(),
        ScanOutcome::Extracted(payload) => Json(payload).into_response(),
    };
    Ok(response)
}

/// Take the bytes of the uploaded file: the `file` field, or else the first field with a file name
async fn read_upload(mut multipart: Multipart) -> Result<Vec<u8>, ScanError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ScanError::Upload(e.to_string()))?
    {
        let is_upload = field.name() == Some(UPLOAD_FIELD) || field.file_name().is_some();
        if !is_upload {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ScanError::Upload(e.to_string()))?;
        return Ok(bytes.to_vec());
    }

    Err(ScanError::Upload(format!(
        "multipart field `{UPLOAD_FIELD}` is required"
    )))
}
