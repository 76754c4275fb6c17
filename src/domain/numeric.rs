use std::str::FromStr;

use rust_decimal::Decimal;

/// Parse a panel decimal-as-text value (`rate`, `min`, `max`, `balance`, ...).
///
/// Accepts surrounding whitespace and scientific notation. Anything that is not a
/// finite decimal yields `None`; callers treat `None` as "no value" rather than an error.
pub fn parse_numeric(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}
