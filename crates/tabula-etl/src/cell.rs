//! Single-cell transformations used by the column steps.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tabula_core::{parse_date, parse_float, Value};

/// Characters stripped by `removeCurrency`, besides whitespace.
const CURRENCY_CHARS: [char; 6] = ['$', '€', '£', '¥', '₹', ','];

/// Decimal places beyond which rounding is a no-op for an `f64`.
const MAX_DECIMALS: u32 = 15;

/// Target case of `changeCase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    /// UPPER
    Upper,
    /// lower
    Lower,
    /// First character upper, rest lower
    Capitalize,
}

/// Component pulled out by `extractDate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatePart {
    /// Calendar year
    Year,
    /// Month number, 1-based
    Month,
    /// Day of month
    Day,
    /// `Q1`..`Q4`
    Quarter,
    /// English weekday name
    DayOfWeek,
    /// English month name
    MonthName,
}

impl DatePart {
    /// Name used for the default output column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
            Self::Quarter => "quarter",
            Self::DayOfWeek => "dayOfWeek",
            Self::MonthName => "monthName",
        }
    }

    /// Extract this part from a parsed date.
    #[must_use]
    pub fn of(self, date: &NaiveDateTime) -> Value {
        match self {
            Self::Year => Value::from(i64::from(date.year())),
            Self::Month => Value::from(i64::from(date.month())),
            Self::Day => Value::from(i64::from(date.day())),
            Self::Quarter => Value::String(format!("Q{}", (date.month() - 1) / 3 + 1)),
            Self::DayOfWeek => Value::String(date.format("%A").to_string()),
            Self::MonthName => Value::String(date.format("%B").to_string()),
        }
    }
}

/// Strip surrounding whitespace. Null stays null.
#[must_use]
pub fn trim(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        v => Value::String(v.to_text().trim().to_string()),
    }
}

/// Change the case of the string form. Null stays null.
#[must_use]
pub fn change_case(value: &Value, case: CaseType) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    let text = value.to_text();
    Value::String(match case {
        CaseType::Upper => text.to_uppercase(),
        CaseType::Lower => text.to_lowercase(),
        CaseType::Capitalize => capitalize(&text),
    })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Strip currency symbols, thousands separators and whitespace, then read
/// the leading number. The original value is kept when nothing parses.
#[must_use]
pub fn remove_currency(value: &Value) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    let cleaned: String = value
        .to_text()
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_CHARS.contains(c))
        .collect();
    parse_float(&cleaned).map_or_else(|| value.clone(), Value::Number)
}

/// Read the leading number of the string form, keeping the original value
/// when nothing parses.
#[must_use]
pub fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(s) => parse_float(s).map_or_else(|| value.clone(), Value::Number),
        Value::Null | Value::Bool(_) => value.clone(),
    }
}

/// Round half away from zero. Values without a leading number are returned
/// unchanged.
#[must_use]
pub fn round(value: &Value, decimals: u32) -> Value {
    let n = match value {
        Value::Number(n) => *n,
        Value::String(s) => match parse_float(s) {
            Some(n) => n,
            None => return value.clone(),
        },
        Value::Null | Value::Bool(_) => return value.clone(),
    };
    if !n.is_finite() || decimals > MAX_DECIMALS {
        return Value::Number(n);
    }
    let factor = 10f64.powi(decimals as i32);
    let rounded = (n * factor).round() / factor;
    Value::Number(if rounded.is_finite() { rounded } else { n })
}

/// Extract a date component; null when the value is not a date.
#[must_use]
pub fn date_part(value: &Value, part: DatePart) -> Value {
    parse_date(value).map_or(Value::Null, |date| part.of(&date))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Text Tests =====

    #[test]
    fn test_trim() {
        assert_eq!(trim(&Value::from("  a b ")), Value::from("a b"));
        assert_eq!(trim(&Value::from(5)), Value::from("5"));
        assert_eq!(trim(&Value::Null), Value::Null);
    }

    #[test]
    fn test_change_case() {
        assert_eq!(change_case(&Value::from("hELLO world"), CaseType::Capitalize), Value::from("Hello world"));
        assert_eq!(change_case(&Value::from("abc"), CaseType::Upper), Value::from("ABC"));
        assert_eq!(change_case(&Value::from("ABC"), CaseType::Lower), Value::from("abc"));
        assert_eq!(change_case(&Value::from(""), CaseType::Capitalize), Value::from(""));
        assert_eq!(change_case(&Value::Null, CaseType::Upper), Value::Null);
    }

    // ===== Numeric Tests =====

    #[test]
    fn test_remove_currency() {
        assert_eq!(remove_currency(&Value::from("$1,234.50")), Value::from(1234.5));
        assert_eq!(remove_currency(&Value::from("€ 99")), Value::from(99));
        assert_eq!(remove_currency(&Value::from("₹-5")), Value::from(-5));
        assert_eq!(remove_currency(&Value::from("n/a")), Value::from("n/a"));
    }

    #[test]
    fn test_to_number_is_lenient() {
        assert_eq!(to_number(&Value::from("12.5kg")), Value::from(12.5));
        assert_eq!(to_number(&Value::from("abc")), Value::from("abc"));
        assert_eq!(to_number(&Value::from(3)), Value::from(3));
        assert_eq!(to_number(&Value::Null), Value::Null);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round(&Value::from(2.5), 0), Value::from(3));
        assert_eq!(round(&Value::from(-2.5), 0), Value::from(-3));
        assert_eq!(round(&Value::from(1.23456), 2), Value::from(1.23));
        assert_eq!(round(&Value::from("7.25"), 1), Value::from(7.3));
    }

    #[test]
    fn test_round_leaves_non_numeric() {
        assert_eq!(round(&Value::from("abc"), 2), Value::from("abc"));
        assert_eq!(round(&Value::Null, 2), Value::Null);
    }

    // ===== Date Tests =====

    #[test]
    fn test_date_parts() {
        let v = Value::from("2024-03-15");
        assert_eq!(date_part(&v, DatePart::Year), Value::from(2024));
        assert_eq!(date_part(&v, DatePart::Month), Value::from(3));
        assert_eq!(date_part(&v, DatePart::Day), Value::from(15));
        assert_eq!(date_part(&v, DatePart::Quarter), Value::from("Q1"));
        assert_eq!(date_part(&v, DatePart::DayOfWeek), Value::from("Friday"));
        assert_eq!(date_part(&v, DatePart::MonthName), Value::from("March"));
        assert_eq!(date_part(&Value::from("2024-12-01"), DatePart::Quarter), Value::from("Q4"));
    }

    #[test]
    fn test_date_part_unparseable_is_null() {
        assert_eq!(date_part(&Value::from("someday"), DatePart::Year), Value::Null);
        assert_eq!(date_part(&Value::Null, DatePart::Year), Value::Null);
    }
}
