//! Timestamp parsing and UTC normalization.
//!
//! Every timestamp written by the store is UTC text in [`STORAGE_FORMAT`]
//! (`2020-01-01 00:00:00`). Stored strings therefore compare lexicographically
//! in chronological order, which the price time-range filters rely on.
//!
//! Accepted inputs:
//! - RFC-3339 with an explicit offset: `2024-03-10T09:30:00-05:00`
//! - naive date-times, taken as UTC: `2024-03-10 14:30:00`, `2024-03-10T14:30:00`
//! - bare dates, taken as UTC midnight: `2024-03-10`

use crate::error::{Result, StoreError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Storage format for every timestamp column
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Soft-deletion sentinel meaning "not deleted"
pub const MAX_DATETIME: &str = "9999-12-31 23:59:59";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Current time in storage format
pub fn now_string() -> String {
    format_utc(&Utc::now())
}

/// Format a UTC instant in storage format
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format(STORAGE_FORMAT).to_string()
}

/// Format a UTC instant as ISO-8601 with a `Z` suffix
pub fn to_iso8601_zulu(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse any accepted timestamp form into UTC
pub fn parse_ts_to_utc(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(StoreError::Validation("timestamp cannot be empty".into()));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(StoreError::Validation(format!("unrecognized timestamp: {}", s)))
}

/// Parse and re-format into storage format
pub fn normalize(s: &str) -> Result<String> {
    parse_ts_to_utc(s).map(|dt| format_utc(&dt))
}

/// Convert a naive wall-clock time in an IANA zone (e.g. "America/New_York") to UTC.
///
/// Ambiguous (fall-back) and nonexistent (spring-forward) local times are errors.
pub fn from_local_naive(naive: NaiveDateTime, tz_name: &str) -> Result<DateTime<Utc>> {
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| StoreError::Validation(format!("unknown time zone: {}", tz_name)))?;

    use chrono::offset::LocalResult::*;
    match tz.from_local_datetime(&naive) {
        Single(dt) => Ok(dt.with_timezone(&Utc)),
        Ambiguous(_, _) => Err(StoreError::Validation(format!(
            "ambiguous local time {} in {}",
            naive, tz_name
        ))),
        None => Err(StoreError::Validation(format!(
            "nonexistent local time {} in {}",
            naive, tz_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_offset_to_utc() {
        assert_eq!(
            normalize("2024-03-10T09:30:00-05:00").unwrap(),
            "2024-03-10 14:30:00"
        );
        assert_eq!(normalize("2020-01-01T00:00:00Z").unwrap(), "2020-01-01 00:00:00");
    }

    #[test]
    fn test_normalize_naive_forms() {
        assert_eq!(normalize("2020-01-01 00:00:00").unwrap(), "2020-01-01 00:00:00");
        assert_eq!(normalize("2020-01-01T08:15:00").unwrap(), "2020-01-01 08:15:00");
        assert_eq!(normalize("2020-01-01").unwrap(), "2020-01-01 00:00:00");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_ts_to_utc("").is_err());
        assert!(parse_ts_to_utc("yesterday").is_err());
    }

    #[test]
    fn test_zulu_format() {
        let dt = parse_ts_to_utc("2020-01-01 00:00:00").unwrap();
        assert_eq!(to_iso8601_zulu(&dt), "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_from_local_naive() {
        let naive =
            NaiveDateTime::parse_from_str("2024-03-11 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let utc = from_local_naive(naive, "America/New_York").unwrap();
        assert_eq!(format_utc(&utc), "2024-03-11 13:30:00");

        // 2024-11-03 01:30 happens twice in New York
        let ambiguous =
            NaiveDateTime::parse_from_str("2024-11-03 01:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert!(from_local_naive(ambiguous, "America/New_York").is_err());

        assert!(from_local_naive(naive, "Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn test_storage_format_sorts_chronologically() {
        assert!(MAX_DATETIME > now_string().as_str());
        assert!("2020-01-02 00:00:00" > "2020-01-01 23:59:59");
    }
}
