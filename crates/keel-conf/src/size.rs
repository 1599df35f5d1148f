//! Human-readable byte sizes such as `512MB`, `1.5g` or `4096`.

use thiserror::Error;

pub const KB: i64 = 1 << 10;
pub const MB: i64 = 1 << 20;
pub const GB: i64 = 1 << 30;
pub const TB: i64 = 1 << 40;
pub const PB: i64 = 1 << 50;

/// Added before truncation so `0.5kb` does not land on 511 through float error.
const ALPHA: f64 = 0.0001;

#[derive(Debug, Error, PartialEq)]
pub enum SizeParseError {
    #[error("'{0}' has no numeric part")]
    MissingNumber(String),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("unknown size unit '{unit}' in '{input}'")]
    UnknownUnit { input: String, unit: String },

    #[error("'{0}' does not fit in 64 bits")]
    Overflow(String),
}

/// Parse a size string into bytes. Units are binary (1k = 1024) and case-insensitive.
pub fn parse_bytes(input: &str) -> Result<i64, SizeParseError> {
    let trimmed = input.trim();
    let split = trimmed
        .rfind(|c: char| c.is_ascii_digit())
        .map(|i| i + 1)
        .ok_or_else(|| SizeParseError::MissingNumber(input.to_string()))?;
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .trim()
        .parse()
        .map_err(|_| SizeParseError::InvalidNumber(input.to_string()))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => KB,
        "m" | "mb" => MB,
        "g" | "gb" => GB,
        "t" | "tb" => TB,
        "p" | "pb" => PB,
        other => {
            return Err(SizeParseError::UnknownUnit {
                input: input.to_string(),
                unit: other.to_string(),
            });
        }
    };

    let bytes = value * multiplier as f64 + ALPHA;
    if !bytes.is_finite() || bytes >= i64::MAX as f64 || bytes <= i64::MIN as f64 {
        return Err(SizeParseError::Overflow(input.to_string()));
    }
    Ok(bytes as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_bytes() {
        assert_eq!(parse_bytes("0"), Ok(0));
        assert_eq!(parse_bytes("4096"), Ok(4096));
        assert_eq!(parse_bytes("4096b"), Ok(4096));
        assert_eq!(parse_bytes("  64B "), Ok(64));
    }

    #[test]
    fn test_units() {
        assert_eq!(parse_bytes("10KB"), Ok(10 * KB));
        assert_eq!(parse_bytes("10k"), Ok(10 * KB));
        assert_eq!(parse_bytes("10MB"), Ok(10 * MB));
        assert_eq!(parse_bytes("1gb"), Ok(GB));
        assert_eq!(parse_bytes("2T"), Ok(2 * TB));
        assert_eq!(parse_bytes("1pb"), Ok(PB));
    }

    #[test]
    fn test_fractions_and_spacing() {
        assert_eq!(parse_bytes("0.5kb"), Ok(512));
        assert_eq!(parse_bytes("1.5 GB"), Ok(GB + GB / 2));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_bytes("MB"), Err(SizeParseError::MissingNumber(_))));
        assert!(matches!(parse_bytes(""), Err(SizeParseError::MissingNumber(_))));
        assert!(matches!(parse_bytes("1.2.3mb"), Err(SizeParseError::InvalidNumber(_))));
        assert!(matches!(
            parse_bytes("10XB"),
            Err(SizeParseError::UnknownUnit { .. })
        ));
        assert!(matches!(parse_bytes("99999999pb"), Err(SizeParseError::Overflow(_))));
    }

    #[test]
    fn test_beyond_i32() {
        assert_eq!(parse_bytes("2GB"), Ok(2 * GB));
        assert!(parse_bytes("2GB").unwrap() > i32::MAX as i64);
    }
}
