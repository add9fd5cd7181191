//! # Server Tests
//!
//! Drives the router end to end with a canned recognizer and lookup.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageOutputFormat, RgbImage};
use serde_json::{json, Value};
use tower::ServiceExt;

use pricetag::backend::ProductLookup;
use pricetag::config::ServerConfig;
use pricetag::errors::ScanError;
use pricetag::label_types::StructuredPayload;
use pricetag::ocr::{RecognizedText, TextRecognizer};
use pricetag::scanner::LabelScanner;
use pricetag::server::build_router;

const BOUNDARY: &str = "pricetag-test-boundary";

struct CannedRecognizer {
    result: Result<String, String>,
}

#[async_trait]
impl TextRecognizer for CannedRecognizer {
    async fn recognize(&self, image: &[u8]) -> Result<RecognizedText, ScanError> {
        assert_eq!(image::guess_format(image).unwrap(), image::ImageFormat::Png);
        match &self.result {
            Ok(text) => Ok(RecognizedText::from_full_text(text.clone())),
            Err(message) => Err(ScanError::Ocr(message.clone())),
        }
    }
}

#[derive(Default)]
struct RecordingLookup {
    received: Mutex<Vec<StructuredPayload>>,
}

#[async_trait]
impl ProductLookup for RecordingLookup {
    async fn search(&self, payload: &StructuredPayload) -> Result<Value, ScanError> {
        self.received.lock().unwrap().push(payload.clone());
        Ok(json!({"items": [{"title": "오뚜기 진라면 매운맛"}], "total": 1}))
    }
}

fn router(recognized: Result<&str, &str>, lookup: Option<Arc<dyn ProductLookup>>) -> Router {
    let recognizer = Arc::new(CannedRecognizer {
        result: recognized.map(str::to_string).map_err(str::to_string),
    });
    build_router(LabelScanner::new(recognizer, lookup), &ServerConfig::default()).unwrap()
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, image::Rgb([200, 200, 200])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .unwrap();
    bytes
}

fn upload_request(field: &str, file_bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"tag.png\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/analyze/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body must be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response must be valid JSON")
}

#[tokio::test]
async fn test_root_message() {
    let response = router(Ok(""), None)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"message": "상품 이미지 분석 API."}));
}

#[tokio::test]
async fn test_healthz() {
    let response = router(Ok(""), None)
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_analyze_forwards_payload_and_relays_answer() {
    let lookup = Arc::new(RecordingLookup::default());
    let app = router(
        Ok("오뚜기\n진라면 매운맛 120g\n1,200원\n8801045123456"),
        Some(lookup.clone()),
    );

    let response = app.oneshot(upload_request("file", &png_bytes())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"items": [{"title": "오뚜기 진라면 매운맛"}], "total": 1})
    );

    let received = lookup.received.lock().unwrap();
    assert_eq!(
        *received,
        vec![StructuredPayload {
            title: "진라면 매운맛".to_string(),
            price: 1200,
            volume: "120g".to_string(),
            brand: "오뚜기".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_analyze_without_forwarding_returns_payload() {
    let app = router(Ok("풀무원\n부침두부 300g\n2,480원"), None);

    let response = app.oneshot(upload_request("file", &png_bytes())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"title": "부침두부", "price": 2480, "volume": "300g", "brand": "풀무원"})
    );
}

#[tokio::test]
async fn test_analyze_accepts_other_file_field_names() {
    let app = router(Ok("풀무원\n부침두부 300g\n2,480원"), None);

    let response = app.oneshot(upload_request("image", &png_bytes())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_product_name_is_bad_request_and_not_forwarded() {
    let lookup = Arc::new(RecordingLookup::default());
    let app = router(Ok("CJ\nSPAM 200g\n3,980"), Some(lookup.clone()));

    let response = app.oneshot(upload_request("file", &png_bytes())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"message": "상품명을 찾을 수 없습니다."})
    );
    assert!(lookup.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_ocr_failure_is_internal_error() {
    let app = router(Err("quota exceeded"), None);

    let response = app.oneshot(upload_request("file", &png_bytes())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("오류 발생: "));
    assert!(message.contains("quota exceeded"));
}

#[tokio::test]
async fn test_unreadable_image_is_internal_error() {
    let app = router(Ok("unused"), None);

    let response = app
        .oneshot(upload_request("file", b"not an image at all"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_upload_without_file_is_bad_request() {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/analyze/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router(Ok("unused"), None).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extract_reads_local_photo_without_backend() {
    let recognizer = Arc::new(CannedRecognizer {
        result: Ok("해표\n식용유 1.8L\n5,980원".to_string()),
    });
    let scanner = LabelScanner::new(recognizer, None);

    let payload = scanner.extract(png_bytes()).await.unwrap();

    assert_eq!(
        payload,
        StructuredPayload {
            title: "식용유".to_string(),
            price: 5980,
            volume: "1.8L".to_string(),
            brand: "해표".to_string(),
        }
    );
}

#[tokio::test]
async fn test_extract_reports_missing_product_name() {
    let recognizer = Arc::new(CannedRecognizer {
        result: Ok("CJ\n8801007654321".to_string()),
    });
    let scanner = LabelScanner::new(recognizer, None);

    let err = scanner.extract(png_bytes()).await.unwrap_err();

    assert!(matches!(err, ScanError::ProductNameNotFound));
    assert_eq!(err.client_message(), "상품명을 찾을 수 없습니다.");
}
