use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

/// How a single value takes part in comparison and search.
///
/// The derived ordering is the rank used when two present values of
/// different kinds meet in a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Number,
    Date,
    String,
    Absent,
}

/// A value together with the representation its kind compares by.
#[derive(Debug, Clone, PartialEq)]
pub enum Typed<'a> {
    Number(f64),
    /// Milliseconds since the Unix epoch; naive times are read as UTC.
    Date(i64),
    Text(Cow<'a, str>),
    Absent,
}

impl Typed<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Typed::Number(_) => ValueKind::Number,
            Typed::Date(_) => ValueKind::Date,
            Typed::Text(_) => ValueKind::String,
            Typed::Absent => ValueKind::Absent,
        }
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Classify a resolved value. Precedence is absent, number, date, string.
pub fn classify(value: Option<&Value>) -> ValueKind {
    typed(value).kind()
}

/// Classify a resolved value and keep the parsed payload.
pub fn typed(value: Option<&Value>) -> Typed<'_> {
    let Some(value) = value else {
        return Typed::Absent;
    };

    if let Some(n) = as_number(value) {
        return Typed::Number(n);
    }
    if let Some(ts) = as_timestamp(value) {
        return Typed::Date(ts);
    }

    match value {
        Value::Null => Typed::Absent,
        other => Typed::Text(display_text(other)),
    }
}

/// Numeric reading of a value: JSON numbers, or strings that parse in full
/// as a finite number.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str accepts "inf" and "nan" spellings
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Timestamp of a date-like string in milliseconds since the epoch.
///
/// Numeric strings are never dates.
pub fn as_timestamp(value: &Value) -> Option<i64> {
    let Value::String(s) = value else {
        return None;
    };
    let s = s.trim();
    if s.is_empty() || parse_number(s).is_some() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.timestamp_millis());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Plain string form of a value, as shown to and searched by users.
pub fn display_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Case-insensitive form used for string ordering: Unicode NFD followed by
/// lowercasing.
pub fn fold_case(s: &str) -> String {
    s.nfd().collect::<String>().to_lowercase()
}

/// Case-insensitive form used for substring matching: Unicode NFC followed by
/// lowercasing. Accented letters stay single characters, so `e` never matches
/// inside `é`.
pub fn search_fold(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_absent() {
        assert_eq!(classify(None), ValueKind::Absent);
    }

    #[test]
    fn test_classify_numbers() {
        assert_eq!(classify(Some(&json!(42))), ValueKind::Number);
        assert_eq!(classify(Some(&json!(-3.5))), ValueKind::Number);
        assert_eq!(classify(Some(&json!("1200"))), ValueKind::Number);
        assert_eq!(classify(Some(&json!(" 15.75 "))), ValueKind::Number);
        assert_eq!(classify(Some(&json!("1e3"))), ValueKind::Number);
    }

    #[test]
    fn test_partial_numbers_are_not_numbers() {
        assert_eq!(classify(Some(&json!("12abc"))), ValueKind::String);
        assert_eq!(classify(Some(&json!("12 km"))), ValueKind::String);
        assert_eq!(classify(Some(&json!("NaN"))), ValueKind::String);
        assert_eq!(classify(Some(&json!("inf"))), ValueKind::String);
        assert_eq!(classify(Some(&json!(""))), ValueKind::String);
        assert_eq!(classify(Some(&json!("1-2"))), ValueKind::String);
    }

    #[test]
    fn test_numeric_strings_are_not_dates() {
        assert_eq!(classify(Some(&json!("2024"))), ValueKind::Number);
        assert_eq!(as_timestamp(&json!("20240101")), None);
    }

    #[test]
    fn test_classify_dates() {
        for s in [
            "2024-03-15",
            "2024/03/15",
            "03/15/2024",
            "2024-03-15T08:30:00Z",
            "2024-03-15T08:30:00.250+02:00",
            "2024-03-15 08:30:00",
            "2024-03-15 08:30",
            "Fri, 15 Mar 2024 08:30:00 +0000",
        ] {
            assert_eq!(classify(Some(&json!(s))), ValueKind::Date, "{}", s);
        }
    }

    #[test]
    fn test_invalid_dates_are_strings() {
        assert_eq!(classify(Some(&json!("2024-13-45"))), ValueKind::String);
        assert_eq!(classify(Some(&json!("next tuesday"))), ValueKind::String);
    }

    #[test]
    fn test_timestamps_order_like_dates() {
        let earlier = as_timestamp(&json!("2024-01-31")).unwrap();
        let later = as_timestamp(&json!("2024-02-01T00:00:00Z")).unwrap();
        assert!(earlier < later);
        assert_eq!(
            as_timestamp(&json!("2024-01-31")),
            as_timestamp(&json!("01/31/2024"))
        );
    }

    #[test]
    fn test_other_values_are_strings() {
        assert_eq!(classify(Some(&json!(true))), ValueKind::String);
        assert_eq!(classify(Some(&json!([1, 2]))), ValueKind::String);
        assert_eq!(classify(Some(&json!({"a": 1}))), ValueKind::String);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&json!("Van")), "Van");
        assert_eq!(display_text(&json!(12.5)), "12.5");
        assert_eq!(display_text(&json!(false)), "false");
        assert_eq!(display_text(&json!(["a", "b"])), r#"["a","b"]"#);
    }

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case("JANE Smith"), "jane smith");
        // composed and decomposed forms fold to the same text
        assert_eq!(fold_case("Caf\u{e9}"), fold_case("Cafe\u{301}"));
    }

    #[test]
    fn test_search_fold_keeps_accents() {
        assert_eq!(search_fold("CAF\u{c9}"), "caf\u{e9}");
        assert_eq!(search_fold("Cafe\u{301}"), search_fold("Caf\u{e9}"));
        assert!(!search_fold("Caf\u{e9}").contains("cafe"));
    }

    #[test]
    fn test_typed_payloads() {
        assert_eq!(typed(Some(&json!("7"))), Typed::Number(7.0));
        assert_eq!(
            typed(Some(&json!("Ford"))),
            Typed::Text(Cow::Borrowed("Ford"))
        );
        assert!(matches!(typed(Some(&json!("2024-01-01"))), Typed::Date(_)));
    }
}
