//! Lenient integer parsing for client supplied numbers.
//!
//! Strings are read the way browsers read form input: leading whitespace is
//! skipped, an optional sign is accepted and parsing stops at the first
//! non-digit. Numbers are truncated toward zero.

use goldpot_types::NumericInput;

/// Parse `input` as an integer, or `None` if no digits are present or the
/// value does not fit in an `i64`.
pub fn parse_integer(input: &NumericInput) -> Option<i64> {
    match input {
        NumericInput::Number(value) => {
            let truncated = value.trunc();
            // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
            if !truncated.is_finite()
                || truncated < i64::MIN as f64
                || truncated >= i64::MAX as f64
            {
                return None;
            }
            Some(truncated as i64)
        }
        NumericInput::Text(text) => parse_leading_integer(text),
    }
}

fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse `input` as a strictly positive integer.
pub fn parse_positive(input: &NumericInput) -> Option<u64> {
    parse_integer(input)
        .filter(|value| *value > 0)
        .map(|value| value as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> NumericInput {
        NumericInput::Text(value.to_string())
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_integer(&NumericInput::Number(10.0)), Some(10));
        assert_eq!(parse_integer(&NumericInput::Number(12.9)), Some(12));
        assert_eq!(parse_integer(&NumericInput::Number(-3.5)), Some(-3));
        assert_eq!(parse_integer(&NumericInput::Number(f64::NAN)), None);
        assert_eq!(parse_integer(&NumericInput::Number(f64::INFINITY)), None);
    }

    #[test]
    fn test_out_of_range_numbers_are_rejected() {
        assert_eq!(parse_integer(&NumericInput::Number(1e25)), None);
        assert_eq!(parse_integer(&NumericInput::Number(-1e25)), None);
        assert_eq!(parse_integer(&NumericInput::Number(9.3e18)), None);
        assert_eq!(
            parse_integer(&NumericInput::Number(9e18)),
            Some(9_000_000_000_000_000_000)
        );
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_integer(&text("42")), Some(42));
        assert_eq!(parse_integer(&text("  7")), Some(7));
        assert_eq!(parse_integer(&text("25abc")), Some(25));
        assert_eq!(parse_integer(&text("3.9")), Some(3));
        assert_eq!(parse_integer(&text("-8")), Some(-8));
        assert_eq!(parse_integer(&text("+5")), Some(5));
        assert_eq!(parse_integer(&text("abc")), None);
        assert_eq!(parse_integer(&text("")), None);
        assert_eq!(parse_integer(&text("-")), None);
        assert_eq!(parse_integer(&text("99999999999999999999999")), None);
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(&text("1")), Some(1));
        assert_eq!(parse_positive(&text("0")), None);
        assert_eq!(parse_positive(&NumericInput::Number(-1.0)), None);
        assert_eq!(parse_positive(&NumericInput::Number(0.4)), None);
    }
}
