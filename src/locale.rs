//! pt-BR number parsing
//!
//! The index service formats numbers the Brazilian way: `,` is the decimal
//! separator and `.` groups thousands. These helpers turn those strings into
//! native numbers and report the offending text when they can't.

/// A string that does not match the expected locale-formatted number
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("'{value}' is not a valid {expected}")]
pub struct ParseError {
    pub value: String,
    pub expected: &'static str,
}

impl ParseError {
    fn new(value: &str, expected: &'static str) -> Self {
        Self {
            value: value.to_string(),
            expected,
        }
    }
}

/// Parse a decimal-comma number such as `"1,234"` into `1.234`
///
/// Every `,` is replaced with `.` before parsing, so a value that already
/// uses a decimal point is accepted as well. Non-finite results are rejected.
///
/// # Example
/// ```
/// use b3_carteira::locale::parse_decimal_comma;
///
/// assert_eq!(parse_decimal_comma("1,234").unwrap(), 1.234);
/// assert!(parse_decimal_comma("abc").is_err());
/// ```
pub fn parse_decimal_comma(raw: &str) -> Result<f64, ParseError> {
    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::new(raw, "decimal-comma number")),
    }
}

/// Parse a dot-grouped integer such as `"12.345"` into `12345`
///
/// # Example
/// ```
/// use b3_carteira::locale::parse_thousands_dot;
///
/// assert_eq!(parse_thousands_dot("1.234.567").unwrap(), 1_234_567);
/// assert!(parse_thousands_dot("12,5").is_err());
/// ```
pub fn parse_thousands_dot(raw: &str) -> Result<i64, ParseError> {
    let digits: String = raw.trim().chars().filter(|c| *c != '.').collect();
    digits
        .parse::<i64>()
        .map_err(|_| ParseError::new(raw, "dot-grouped integer"))
}
