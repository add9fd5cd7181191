//! # Label Patterns Module
//!
//! This module contains the regex patterns and fixed vocabularies used to
//! classify lines of OCR text read from Korean retail price tags.

use lazy_static::lazy_static;
use regex::Regex;

/// Brand keywords, scanned in this order. The first keyword contained in a line wins.
pub const BRAND_KEYWORDS: [&str; 9] = [
    "청정원", "오뚜기", "CJ", "풀무원", "해표", "샘표", "롯데", "대상", "해태",
];

/// Promotional tags that mark a line as noise (event item, event period, unit price, reference basis)
pub const NOISE_KEYWORDS: [&str; 4] = ["행사상품", "행사기간", "단위가격", "기준"];

/// Currency suffix appended to the resolved display price
pub const CURRENCY_SUFFIX: &str = "원";

/// Priority of comma-grouped price candidates such as `12,900`
pub const PRIMARY_PRICE_PRIORITY: u8 = 20;

/// Priority of bare or `원`-suffixed price candidates inside the plausible range
pub const GENERAL_PRICE_PRIORITY: u8 = 5;

/// Inclusive range a general-priority price must fall into
pub const MIN_GENERAL_PRICE: u64 = 500;
pub const MAX_GENERAL_PRICE: u64 = 100_000;

/// Lines this short (in characters) never become product-name candidates
pub const MIN_NAME_CANDIDATE_CHARS: usize = 3;

pub const BARCODE_PATTERN: &str = r"^\d{12,14}$";
pub const DATE_PATTERN: &str = r"\d{4}[./-]\d{2}[./-]?\d{0,2}";
pub const UNIT_PRICE_REMNANT_PATTERN: &str = r"^\d{2,3}\s*,?\d{3}$";
pub const VOLUME_PATTERN: &str = r"(?i)(\d+\.?\d*)\s?(ml|g|kg|L|ℓ|G)";
pub const HANGUL_PATTERN: &str = r"[가-힣]";

lazy_static! {
    pub static ref BARCODE_REGEX: Regex =
        Regex::new(BARCODE_PATTERN).expect("Barcode pattern should be valid");
    pub static ref DATE_REGEX: Regex =
        Regex::new(DATE_PATTERN).expect("Date pattern should be valid");
    pub static ref UNIT_PRICE_REMNANT_REGEX: Regex = Regex::new(UNIT_PRICE_REMNANT_PATTERN)
        .expect("Unit price remnant pattern should be valid");
    pub static ref VOLUME_REGEX: Regex =
        Regex::new(VOLUME_PATTERN).expect("Volume pattern should be valid");
    pub static ref HANGUL_REGEX: Regex =
        Regex::new(HANGUL_PATTERN).expect("Hangul pattern should be valid");
    /// A single Unicode decimal digit (any script, e.g. fullwidth `３`)
    pub static ref DECIMAL_DIGIT_REGEX: Regex =
        Regex::new(r"^\d$").expect("Decimal digit pattern should be valid");

    /// Comma-grouped prices, tried in order. The first pattern that matches a line wins.
    pub static ref PRIMARY_PRICE_REGEXES: Vec<Regex> = vec![
        Regex::new(r"(\d{1,3},\d{3})").expect("Primary price pattern should be valid"),
        Regex::new(r"(\d{1,3}\s*,\s*\d{3})").expect("Spaced primary price pattern should be valid"),
    ];

    /// General prices, tried in order. Only the first pattern that matches a line is range-checked.
    pub static ref GENERAL_PRICE_REGEXES: Vec<Regex> = vec![
        Regex::new(r"(\d{1,3}(,\d{3})+)\s*원?").expect("Grouped price pattern should be valid"),
        Regex::new(r"(\d+)\s*원").expect("Won price pattern should be valid"),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barcode_pattern() {
        assert!(BARCODE_REGEX.is_match("880104512345"));
        assert!(BARCODE_REGEX.is_match("8801045123456"));
        assert!(BARCODE_REGEX.is_match("88010451234567"));
        assert!(!BARCODE_REGEX.is_match("88010451234"));
        assert!(!BARCODE_REGEX.is_match("880104512345678"));
        assert!(!BARCODE_REGEX.is_match("8801045123456 a"));
    }

    #[test]
    fn test_date_pattern() {
        assert!(DATE_REGEX.is_match("2024-03-15"));
        assert!(DATE_REGEX.is_match("2024.03"));
        assert!(DATE_REGEX.is_match("유통기한 2024/03/15 까지"));
        assert!(!DATE_REGEX.is_match("24-03-15"));
        assert!(!DATE_REGEX.is_match("1,200원"));
    }

    #[test]
    fn test_unit_price_remnant_pattern() {
        assert!(UNIT_PRICE_REMNANT_REGEX.is_match("12,900"));
        assert!(UNIT_PRICE_REMNANT_REGEX.is_match("129000"));
        assert!(UNIT_PRICE_REMNANT_REGEX.is_match("12 ,900"));
        assert!(!UNIT_PRICE_REMNANT_REGEX.is_match("1,200"));
        assert!(!UNIT_PRICE_REMNANT_REGEX.is_match("12,900원"));
    }

    #[test]
    fn test_volume_pattern_units() {
        let cases = vec![
            ("진라면 120g", Some("120g")),
            ("간장 500 ml", Some("500 ml")),
            ("설탕 1kg", Some("1kg")),
            ("식용유 1.8L", Some("1.8L")),
            ("생수 2ℓ", Some("2ℓ")),
            ("참치 150G", Some("150G")),
            ("우유 900ML", Some("900ML")),
            ("라면 다섯개", None),
        ];

        for (text, expected) in cases {
            let found = VOLUME_REGEX.find(text).map(|m| m.as_str());
            assert_eq!(found, expected, "Volume pattern failed for: '{}'", text);
        }
    }

    #[test]
    fn test_primary_price_patterns_order() {
        let spaced = "12 , 900";
        assert!(PRIMARY_PRICE_REGEXES[0].find(spaced).is_none());
        assert_eq!(
            PRIMARY_PRICE_REGEXES[1].captures(spaced).unwrap().get(1).unwrap().as_str(),
            "12 , 900"
        );
    }

    #[test]
    fn test_hangul_pattern() {
        assert!(HANGUL_REGEX.is_match("진라면"));
        assert!(!HANGUL_REGEX.is_match("ABC 123"));
        // Jamo alone are not complete syllables
        assert!(!HANGUL_REGEX.is_match("ㅋㅋ"));
    }

    #[test]
    fn test_decimal_digit_pattern() {
        assert!(DECIMAL_DIGIT_REGEX.is_match("7"));
        assert!(DECIMAL_DIGIT_REGEX.is_match("７"));
        assert!(!DECIMAL_DIGIT_REGEX.is_match("77"));
        assert!(!DECIMAL_DIGIT_REGEX.is_match("원"));
    }
}
