//! Column conversions shared by the table modules.
//!
//! Timestamps are stored as Unix milliseconds so that `cached_at < ?` and
//! `ORDER BY searched_at DESC` compare numerically.

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::types::Type;
use serde::de::DeserializeOwned;

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(idx: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Integer,
            format!("timestamp out of range: {millis}").into(),
        )
    })
}

pub(crate) fn from_json<T: DeserializeOwned>(idx: usize, json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Build a `LIKE` pattern matching `fragment` anywhere in the column.
///
/// `%`, `_` and the escape character itself are matched literally; queries
/// must declare `ESCAPE '\'`.
pub(crate) fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_round_trip() {
        let now = Utc::now();
        let back = from_millis(0, to_millis(now)).unwrap();
        assert_eq!(back.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("za pa"), "%za pa%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
