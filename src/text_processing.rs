//! # Text Processing Module
//!
//! This module turns the raw OCR text of a price tag into structured fields.
//!
//! ## Features
//!
//! - Line classification with exclusion filters (barcodes, dates, promotional tags,
//!   stray unit-price remnants)
//! - First-match-wins brand and volume detection
//! - Two-tier price candidate scoring with a stable best-candidate pick
//! - Product-name selection preferring lines that mention the brand or volume
//! - Price normalization to an integer that never fails

use log::{debug, info, trace};

use crate::label_patterns::{
    BARCODE_REGEX, BRAND_KEYWORDS, CURRENCY_SUFFIX, DATE_REGEX, DECIMAL_DIGIT_REGEX,
    GENERAL_PRICE_PRIORITY,
    GENERAL_PRICE_REGEXES, HANGUL_REGEX, MAX_GENERAL_PRICE, MIN_GENERAL_PRICE,
    MIN_NAME_CANDIDATE_CHARS, NOISE_KEYWORDS, PRIMARY_PRICE_PRIORITY, PRIMARY_PRICE_REGEXES,
    UNIT_PRICE_REMNANT_REGEX, VOLUME_REGEX,
};
use crate::label_types::{ClassifiedLines, ExtractionRecord, PriceCandidate};

const NAME_STRIP_CHARS: &[char] = &['-', ')', '(', ' '];

/// Extract product name, price, volume and brand from the full OCR text
///
/// Absent text behaves like empty text: every field resolves to `None`.
///
/// # Examples
///
/// ```rust
/// use pricetag::text_processing::extract_fields;
///
/// let record = extract_fields(Some("오뚜기\n진라면 매운맛 120g\n1,200원\n8801045123456"));
///
/// assert_eq!(record.brand.as_deref(), Some("오뚜기"));
/// assert_eq!(record.volume.as_deref(), Some("120g"));
/// assert_eq!(record.price.as_deref(), Some("1,200원"));
/// assert_eq!(record.product_name.as_deref(), Some("진라면 매운맛"));
/// ```
pub fn extract_fields(full_text: Option<&str>) -> ExtractionRecord {
    let classified = classify_lines(full_text.unwrap_or_default());
    resolve_fields(&classified)
}

/// Split the OCR text into trimmed lines and sort them into candidate pools
///
/// Lines are visited top to bottom. Excluded lines contribute nothing. Brand and
/// volume are set by the first line that matches and never revisited; every
/// remaining line may add price and product-name candidates.
pub fn classify_lines(full_text: &str) -> ClassifiedLines {
    let mut classified = ClassifiedLines::default();

    let lines = full_text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty());

    for line in lines {
        debug!("Analyzing line: '{}'", line);

        if let Some(reason) = exclusion_reason(line) {
            debug!("Skipping line '{}': {}", line, reason);
            continue;
        }

        if classified.brand.is_none() {
            if let Some(keyword) = BRAND_KEYWORDS.iter().find(|keyword| line.contains(*keyword)) {
                debug!("Detected brand: {}", keyword);
                classified.brand = Some(keyword.to_string());
            }
        }

        if classified.volume.is_none() {
            if let Some(found) = VOLUME_REGEX.find(line) {
                debug!("Detected volume: {}", found.as_str());
                classified.volume = Some(found.as_str().to_string());
            }
        }

        if let Some(value) = primary_price(line) {
            debug!("Primary price candidate: {}", value);
            classified
                .price_candidates
                .push(PriceCandidate::new(value, PRIMARY_PRICE_PRIORITY));
        }

        if let Some(value) = general_price(line) {
            debug!("General price candidate: {}", value);
            classified
                .price_candidates
                .push(PriceCandidate::new(value, GENERAL_PRICE_PRIORITY));
        }

        if is_name_candidate(line) {
            trace!("Product name candidate: '{}'", line);
            classified.name_candidates.push(line.to_string());
        }
    }

    debug!(
        "Classified lines: brand={:?}, volume={:?}, {} price candidates, {} name candidates",
        classified.brand,
        classified.volume,
        classified.price_candidates.len(),
        classified.name_candidates.len()
    );

    classified
}

/// Pick the final fields out of the candidate pools
pub fn resolve_fields(classified: &ClassifiedLines) -> ExtractionRecord {
    let record = ExtractionRecord {
        product_name: resolve_product_name(
            &classified.name_candidates,
            classified.brand.as_deref(),
            classified.volume.as_deref(),
        ),
        price: resolve_price(&classified.price_candidates),
        volume: classified.volume.clone(),
        brand: classified.brand.clone(),
    };

    info!(
        "Resolved label fields: product_name={:?}, price={:?}, volume={:?}, brand={:?}",
        record.product_name, record.price, record.volume, record.brand
    );

    record
}

/// Choose the highest-priority price and format it for display
///
/// Equal priorities keep line order, so the earliest line wins a tie.
///
/// # Examples
///
/// ```rust
/// use pricetag::label_types::PriceCandidate;
/// use pricetag::text_processing::resolve_price;
///
/// let candidates = vec![PriceCandidate::new("3500", 5), PriceCandidate::new("12900", 20)];
/// assert_eq!(resolve_price(&candidates).as_deref(), Some("12,900원"));
/// assert_eq!(resolve_price(&[]), None);
/// ```
pub fn resolve_price(candidates: &[PriceCandidate]) -> Option<String> {
    let mut ranked: Vec<&PriceCandidate> = candidates.iter().collect();
    ranked.sort_by(|a, b| b.priority.cmp(&a.priority));

    let best = ranked.first()?;
    let display = format!("{}{}", group_thousands(&best.value), CURRENCY_SUFFIX);
    debug!("Selected price {} (priority {})", display, best.priority);
    Some(display)
}

/// Choose the product-name line and strip brand, volume and surrounding punctuation
///
/// Lines mentioning the detected brand or volume are preferred over all others.
/// Within the chosen set the longest line wins, the earliest on ties. The brand and
/// the volume are each removed once. A name that strips down to nothing is absent.
pub fn resolve_product_name(
    candidates: &[String],
    brand: Option<&str>,
    volume: Option<&str>,
) -> Option<String> {
    let mentions_label = |line: &&String| {
        brand.is_some_and(|brand| line.contains(brand))
            || volume.is_some_and(|volume| line.contains(volume))
    };

    let preferred: Vec<&String> = candidates.iter().filter(mentions_label).collect();
    let pool: Vec<&String> = if preferred.is_empty() {
        candidates.iter().collect()
    } else {
        preferred
    };

    let chosen = longest_line(&pool)?;
    debug!("Selected product name line: '{}'", chosen);

    let mut name = chosen.clone();
    if let Some(brand) = brand {
        name = name.replacen(brand, "", 1);
    }
    if let Some(volume) = volume {
        name = name.replacen(volume, "", 1);
    }

    let name = strip_name_punctuation(&name);
    if name.is_empty() {
        debug!("Product name line '{}' is empty after stripping", chosen);
        return None;
    }

    Some(name.to_string())
}

/// Convert a display price to an integer; anything unparsable becomes zero
///
/// # Examples
///
/// ```rust
/// use pricetag::text_processing::parse_price;
///
/// assert_eq!(parse_price(Some("12,900원")), 12900);
/// assert_eq!(parse_price(Some("３,５００원")), 3500);
/// assert_eq!(parse_price(Some("가격 미정")), 0);
/// assert_eq!(parse_price(None), 0);
/// ```
pub fn parse_price(price: Option<&str>) -> i64 {
    let Some(price) = price else {
        return 0;
    };

    let digits = ascii_digits(&price.replace(',', "").replace(CURRENCY_SUFFIX, ""));
    match digits.trim().parse::<i64>() {
        Ok(value) => value,
        Err(e) => {
            debug!("Could not parse price '{}': {}", price, e);
            0
        }
    }
}

fn exclusion_reason(line: &str) -> Option<&'static str> {
    if BARCODE_REGEX.is_match(line) {
        return Some("barcode");
    }
    if DATE_REGEX.is_match(line) {
        return Some("date");
    }
    if NOISE_KEYWORDS.iter().any(|tag| line.contains(tag)) {
        return Some("promotional tag");
    }
    if UNIT_PRICE_REMNANT_REGEX.is_match(line) {
        return Some("unit price remnant");
    }
    None
}

fn primary_price(line: &str) -> Option<String> {
    let captures = PRIMARY_PRICE_REGEXES
        .iter()
        .find_map(|pattern| pattern.captures(line))?;
    let value = captures.get(1)?.as_str();
    Some(value.chars().filter(|c| !c.is_whitespace()).collect())
}

fn general_price(line: &str) -> Option<String> {
    // Only the first pattern that matches is considered, even when it is out of range
    let captures = GENERAL_PRICE_REGEXES
        .iter()
        .find_map(|pattern| pattern.captures(line))?;
    let value = captures.get(1)?.as_str().replace(',', "");

    let amount: u64 = ascii_digits(&value).parse().ok()?;
    if (MIN_GENERAL_PRICE..=MAX_GENERAL_PRICE).contains(&amount) {
        Some(value)
    } else {
        trace!("Ignoring out-of-range price {} in line '{}'", amount, line);
        None
    }
}

fn is_name_candidate(line: &str) -> bool {
    line.chars().count() > MIN_NAME_CANDIDATE_CHARS
        && HANGUL_REGEX.is_match(line)
        && !line.chars().all(|c| c.is_numeric())
}

fn longest_line<'a>(lines: &[&'a String]) -> Option<&'a String> {
    let mut best: Option<(&'a String, usize)> = None;
    for &line in lines {
        let length = line.chars().count();
        match best {
            Some((_, best_length)) if best_length >= length => {}
            _ => best = Some((line, length)),
        }
    }
    best.map(|(line, _)| line)
}

/// Insert a thousands comma three digits from the end when none is present
fn group_thousands(value: &str) -> String {
    if value.chars().count() < 4 || value.contains(',') {
        return value.to_string();
    }

    match value.char_indices().rev().nth(2) {
        Some((split, _)) => format!("{},{}", &value[..split], &value[split..]),
        None => value.to_string(),
    }
}

/// Rewrite every Unicode decimal digit as its ASCII counterpart, leaving other characters alone
fn ascii_digits(value: &str) -> String {
    value
        .chars()
        .map(|c| match decimal_digit_value(c) {
            Some(digit) => char::from_digit(digit, 10).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Numeric value of a decimal digit from any script
///
/// Decimal digits are encoded as contiguous runs of 0 through 9, so the value is
/// the distance from the start of the run the character belongs to.
fn decimal_digit_value(c: char) -> Option<u32> {
    if let Some(digit) = c.to_digit(10) {
        return Some(digit);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut start = c as u32;
    while let Some(previous) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(previous) {
            break;
        }
        start -= 1;
    }
    Some((c as u32 - start) % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT_REGEX.is_match(c.encode_utf8(&mut buf))
}

fn strip_name_punctuation(name: &str) -> &str {
    let name = name.trim_matches(NAME_STRIP_CHARS);
    let name = name.strip_prefix(')').unwrap_or(name);
    let name = name.strip_suffix(')').unwrap_or(name);
    name.strip_prefix('(').unwrap_or(name)
}
