//! Human-readable size parsing ("512 MB" -> bytes).
//!
//! The account page reports sizes with a coarse unit suffix. Only `KB`, `MB`
//! and `GB` are recognized (case-sensitive, binary multipliers).

use thiserror::Error;

/// Recognized unit tokens, checked in this order; the first one present wins.
const UNITS: [(&str, u64); 3] = [
    ("KB", 1024),
    ("MB", 1024 * 1024),
    ("GB", 1024 * 1024 * 1024),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeParseError {
    /// None of the unit tokens occur in the text.
    #[error("no size unit in {0:?}")]
    NoUnit(String),
    /// A unit was found but the remainder is not a single non-negative number.
    #[error("invalid number {number:?} in size {text:?}")]
    InvalidNumber { text: String, number: String },
}

/// Parses a size string such as `"10 MB"` or `"1.5GB"` into a byte count.
///
/// The unit is stripped and the remainder must be exactly one numeric token.
/// Fractional results are rounded to whole bytes.
pub fn parse_size(text: &str) -> Result<u64, SizeParseError> {
    let Some((unit, multiplier)) = UNITS.iter().find(|(unit, _)| text.contains(unit)) else {
        return Err(SizeParseError::NoUnit(text.to_string()));
    };

    let stripped = text.replace(unit, "");
    let mut tokens = stripped.split_whitespace();
    let number = match (tokens.next(), tokens.next()) {
        (Some(n), None) => n,
        _ => {
            return Err(SizeParseError::InvalidNumber {
                text: text.to_string(),
                number: stripped.trim().to_string(),
            })
        }
    };

    let invalid = || SizeParseError::InvalidNumber {
        text: text.to_string(),
        number: number.to_string(),
    };
    let value: f64 = number.parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    Ok((value * *multiplier as f64).round() as u64)
}

/// Like [`parse_size`] but degrades every failure to "unknown".
pub fn parse_size_opt(text: &str) -> Option<u64> {
    match parse_size(text) {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::debug!(kind = "parse_failure", "{}", e);
            None
        }
    }
}

/// Whether an observed size is within `tolerance` bytes of the expected one.
pub fn sizes_match(expected: u64, actual: u64, tolerance: u64) -> bool {
    expected.abs_diff(actual) <= tolerance
}

/// Formats a byte count with the largest unit that keeps the value >= 1.
pub fn format_size(bytes: u64) -> String {
    UNITS
        .iter()
        .rev()
        .find(|(_, multiplier)| bytes >= *multiplier)
        .map(|(unit, multiplier)| format!("{:.2} {}", bytes as f64 / *multiplier as f64, unit))
        .unwrap_or_else(|| format!("{bytes} B"))
}
