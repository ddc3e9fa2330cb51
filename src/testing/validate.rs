//! Pure response-shape helpers
//!
//! Nothing here performs I/O; scenarios combine these into their checks.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Keys from `keys` that are absent from the object
pub fn missing_keys<'a>(value: &Value, keys: &[&'a str]) -> Vec<&'a str> {
    keys.iter()
        .copied()
        .filter(|key| value.get(*key).is_none())
        .collect()
}

/// Keys from `keys` that are absent or hold an empty value
pub fn missing_or_empty<'a>(value: &Value, keys: &[&'a str]) -> Vec<&'a str> {
    keys.iter()
        .copied()
        .filter(|key| value.get(*key).map_or(true, is_blank))
        .collect()
}

/// Keys from `keys` that are present in the object
pub fn present_keys<'a>(value: &Value, keys: &[&'a str]) -> Vec<&'a str> {
    keys.iter()
        .copied()
        .filter(|key| value.get(*key).is_some())
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// Length of the array stored under `key`, if it is one
pub fn array_len(value: &Value, key: &str) -> Option<usize> {
    value.get(key).and_then(Value::as_array).map(Vec::len)
}

/// Case-insensitive substring match against any keyword
pub fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let text = text.to_lowercase();
    keywords
        .iter()
        .any(|keyword| text.contains(&keyword.to_lowercase()))
}

/// Number of non-blank paragraphs separated by blank lines
pub fn paragraph_count(text: &str) -> usize {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .count()
}

/// Naive forms accepted after RFC 3339; `T` or a space between date and time
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp, with `Z`, an offset, no zone, or a bare date
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Whether a 400 reply explains itself with the word "required"
pub fn error_mentions_required(body: &Value) -> bool {
    body.get("error")
        .and_then(Value::as_str)
        .is_some_and(|error| error.to_lowercase().contains("required"))
}

/// A cardinality constraint on a list-valued field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Count {
    pub fn admits(&self, len: usize) -> bool {
        match *self {
            Count::Exactly(n) => len == n,
            Count::AtLeast(n) => len >= n,
            Count::Between(lo, hi) => (lo..=hi).contains(&len),
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Exactly(n) => write!(f, "exactly {n}"),
            Count::AtLeast(n) => write!(f, "at least {n}"),
            Count::Between(lo, hi) => write!(f, "between {lo} and {hi}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_keys_and_present_keys() {
        let body = json!({"profileId": "p1", "profileType": "standard", "studentName": ""});
        let keys = ["profileId", "generatedProfile", "studentName"];
        assert_eq!(missing_keys(&body, &keys), vec!["generatedProfile"]);
        assert_eq!(missing_or_empty(&body, &keys), vec!["generatedProfile", "studentName"]);
        assert_eq!(present_keys(&body, &keys), vec!["profileId", "studentName"]);
    }

    #[test]
    fn test_missing_keys_on_non_object() {
        assert_eq!(missing_keys(&json!([1, 2]), &["id"]), vec!["id"]);
    }

    #[test]
    fn test_mentions_any_ignores_case() {
        assert!(mentions_any("Use a VISUAL schedule", &["visual", "routine"]));
        assert!(!mentions_any("Extra time on tests", &["sensory", "transition"]));
    }

    #[test]
    fn test_paragraph_count() {
        assert_eq!(paragraph_count("One.\n\nTwo.\n\n\n\nThree."), 3);
        assert_eq!(paragraph_count("One.\r\n\r\nTwo."), 2);
        assert_eq!(paragraph_count("   "), 0);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-09-01T12:30:00.000Z").is_some());
        assert!(parse_timestamp("2024-09-01T12:30:00+02:00").is_some());
        assert!(parse_timestamp("2024-09-01T12:30:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_timestamp_space_separated_and_date_only() {
        let spaced = parse_timestamp("2024-09-01 12:30:00").unwrap();
        assert_eq!(spaced, parse_timestamp("2024-09-01T12:30:00").unwrap());
        assert!(parse_timestamp("2024-09-01 12:30:00.250").is_some());
        assert!(parse_timestamp("2024-09-01 12:30:00+02:00").is_some());

        let midnight = parse_timestamp("2024-09-01").unwrap();
        assert_eq!(midnight, parse_timestamp("2024-09-01T00:00:00Z").unwrap());
        assert!(parse_timestamp("2024-13-01").is_none());
    }

    #[test]
    fn test_error_mentions_required() {
        assert!(error_mentions_required(&json!({"error": "Missing required fields"})));
        assert!(!error_mentions_required(&json!({"error": "Bad request"})));
        assert!(!error_mentions_required(&json!({"message": "required"})));
    }

    #[test]
    fn test_count_rules() {
        assert!(Count::Exactly(3).admits(3));
        assert!(!Count::Exactly(3).admits(4));
        assert!(Count::AtLeast(3).admits(4));
        assert!(Count::Between(5, 10).admits(5));
        assert!(Count::Between(5, 10).admits(10));
        assert!(!Count::Between(5, 10).admits(11));
        assert_eq!(Count::Between(12, 18).to_string(), "between 12 and 18");
    }
}
