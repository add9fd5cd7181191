//! # Price Tag Scanner
//!
//! An HTTP service that reads a photo of a Korean retail price tag with OCR,
//! extracts the product name, price, volume and brand from the recognized text,
//! and forwards them to a shopping backend as a structured lookup request.

pub mod backend;
pub mod config;
pub mod errors;
pub mod label_patterns;
pub mod label_types;
pub mod ocr;
pub mod preprocessing;
pub mod scanner;
pub mod server;
pub mod text_processing;
