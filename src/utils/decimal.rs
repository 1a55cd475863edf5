use crate::error::{ProcessingError, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a balance value that may use a comma as the decimal separator.
///
/// The comma is swapped for a period before parsing, so `"100,50"` and
/// `"100.50"` both yield `100.50`. The value stays an exact decimal.
pub fn parse_locale_decimal(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ProcessingError::InvalidFormat(
            "Empty balance value".to_string(),
        ));
    }

    let normalized = trimmed.replace(',', ".");

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid balance value: '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separator() {
        assert_eq!(parse_locale_decimal("100,50").unwrap(), Decimal::new(10050, 2));
        assert_eq!(parse_locale_decimal(" -7,3 ").unwrap(), Decimal::new(-73, 1));
    }

    #[test]
    fn test_plain_numeric() {
        assert_eq!(parse_locale_decimal("50.25").unwrap(), Decimal::new(5025, 2));
        assert_eq!(parse_locale_decimal("42").unwrap(), Decimal::from(42));
        assert_eq!(parse_locale_decimal("1e3").unwrap(), Decimal::from(1000));
    }

    #[test]
    fn test_exact_summation() {
        let a = parse_locale_decimal("0,1").unwrap();
        let b = parse_locale_decimal("0,2").unwrap();
        assert_eq!(a + b, Decimal::new(3, 1));
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(parse_locale_decimal("").is_err());
        assert!(parse_locale_decimal("abc").is_err());
        // Thousands separator plus decimal comma leaves two periods
        assert!(parse_locale_decimal("1.234,56").is_err());
    }
}
