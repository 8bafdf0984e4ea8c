//! Number parsing and formatting with browser-compatible semantics.
//!
//! Dashboard data arrives as loosely typed JSON, so every engine agrees on one
//! set of rules for turning strings into numbers and numbers into strings.

/// Parse a string the way a strict numeric conversion does.
///
/// Surrounding whitespace is ignored, the empty string is zero, hex literals
/// and `Infinity` are accepted, anything else that is not a complete decimal
/// literal is NaN.
#[must_use]
pub fn parse_number(input: &str) -> f64 {
    let s = input.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |v| v as f64);
    }
    // Rust also accepts "inf"/"nan" spellings; those are not numbers here.
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// Parse the longest numeric prefix of a string.
///
/// `"12.5kg"` is `12.5`, `"abc"` is `None`.
#[must_use]
pub fn parse_float(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        return Some(if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = i;
    while bytes.get(i).is_some_and(u8::is_ascii_digit) {
        i += 1;
    }
    let mut has_digits = i > int_start;

    if bytes.get(i) == Some(&b'.') {
        let frac_start = i + 1;
        let mut j = frac_start;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > frac_start || has_digits {
            has_digits |= j > frac_start;
            i = j;
        }
    }
    if !has_digits {
        return None;
    }

    let mut end = i;
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while bytes.get(j).is_some_and(u8::is_ascii_digit) {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    s[..end].trim_end_matches('.').parse().ok()
}

/// Format a number in its shortest form: integers without a fraction,
/// `NaN`/`Infinity` spelled out, never exponent notation.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ===== parse_number Tests =====

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("42"), 42.0);
        assert_eq!(parse_number(" -3.5 "), -3.5);
        assert_eq!(parse_number(".5"), 0.5);
        assert_eq!(parse_number("1e3"), 1000.0);
    }

    #[test]
    fn test_parse_number_empty_is_zero() {
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("   "), 0.0);
    }

    #[test]
    fn test_parse_number_special_forms() {
        assert_eq!(parse_number("0x1F"), 31.0);
        assert_eq!(parse_number("Infinity"), f64::INFINITY);
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("nan").is_nan());
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert!(parse_number("12abc").is_nan());
        assert!(parse_number("$5").is_nan());
        assert!(parse_number("1,000").is_nan());
        assert!(parse_number("1.2.3").is_nan());
    }

    // ===== parse_float Tests =====

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("12.5kg"), Some(12.5));
        assert_eq!(parse_float("  -7 apples"), Some(-7.0));
        assert_eq!(parse_float("3."), Some(3.0));
        assert_eq!(parse_float("2e5x"), Some(200_000.0));
        assert_eq!(parse_float("2ex"), Some(2.0));
    }

    #[test]
    fn test_parse_float_none() {
        assert_eq!(parse_float("abc"), None);
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("-"), None);
    }

    // ===== format_number Tests =====

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(150.0), "150");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(-2.25), "-2.25");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(1e21), "1000000000000000000000");
    }

    proptest! {
        #[test]
        fn prop_format_then_parse_is_lossless(n in -1.0e12f64..1.0e12) {
            prop_assert_eq!(parse_number(&format_number(n)), n);
        }
    }
}
