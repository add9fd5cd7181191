//! # Label Types Module
//!
//! This module defines the core types produced while reading a price tag:
//! the per-request candidate pools, the resolved extraction record and the
//! structured payload sent to the shopping backend.

use serde::{Deserialize, Serialize};

use crate::text_processing::parse_price;

/// A price found on one line, with the priority of the pattern that found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCandidate {
    /// Digits of the price, possibly with a thousands comma (e.g. "12,900", "1200")
    pub value: String,
    /// Higher wins; equal priorities keep line order
    pub priority: u8,
}

impl PriceCandidate {
    pub fn new(value: impl Into<String>, priority: u8) -> Self {
        Self {
            value: value.into(),
            priority,
        }
    }
}

/// Candidate pools gathered in a single pass over the OCR lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedLines {
    /// First brand keyword found, if any
    pub brand: Option<String>,
    /// First volume/weight match found (e.g. "120g"), if any
    pub volume: Option<String>,
    /// Price candidates in line order
    pub price_candidates: Vec<PriceCandidate>,
    /// Lines that could be the product name, untouched, in line order
    pub name_candidates: Vec<String>,
}

/// Fields resolved from one price tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionRecord {
    pub product_name: Option<String>,
    /// Display price such as "1,200원"
    pub price: Option<String>,
    pub volume: Option<String>,
    pub brand: Option<String>,
}

impl ExtractionRecord {
    /// Build the wire payload, defaulting missing fields to empty strings and zero
    pub fn to_payload(&self) -> StructuredPayload {
        StructuredPayload {
            title: self.product_name.clone().unwrap_or_default(),
            price: parse_price(self.price.as_deref()),
            volume: self.volume.clone().unwrap_or_default(),
            brand: self.brand.clone().unwrap_or_default(),
        }
    }
}

/// Lookup request posted to the shopping backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPayload {
    pub title: String,
    pub price: i64,
    pub volume: String,
    pub brand: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_defaults_for_missing_fields() {
        let record = ExtractionRecord {
            product_name: Some("진라면 매운맛".to_string()),
            ..Default::default()
        };

        let payload = record.to_payload();
        assert_eq!(payload.title, "진라면 매운맛");
        assert_eq!(payload.price, 0);
        assert_eq!(payload.volume, "");
        assert_eq!(payload.brand, "");
    }

    #[test]
    fn test_payload_serializes_wire_field_names() {
        let payload = StructuredPayload {
            title: "진라면 매운맛".to_string(),
            price: 1200,
            volume: "120g".to_string(),
            brand: "오뚜기".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "진라면 매운맛",
                "price": 1200,
                "volume": "120g",
                "brand": "오뚜기"
            })
        );
    }
}
