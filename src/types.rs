//! Common types used throughout the tap
//!
//! Shared JSON aliases and the timestamp helpers used for bookmarks,
//! config dates and report rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type, used for emitted records
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Timestamps
// ============================================================================

/// Format used when writing bookmarks and `time_extracted`
pub const BOOKMARK_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Format of the `from` / `to` dates sent to the report API
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a timestamp string into a UTC instant
///
/// Accepts RFC 3339 (with `Z` or an offset) and naive date-times, with or
/// without fractional seconds; naive values are taken as UTC. A bare date
/// is midnight UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Offsets without a colon, e.g. +0100
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }

    let formats = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for fmt in formats {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, REPORT_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Format an instant the way bookmarks are stored
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(BOOKMARK_FORMAT).to_string()
}

/// Format the calendar date of an instant for report requests
pub fn format_report_date(date: NaiveDate) -> String {
    date.format(REPORT_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    #[test_case("2021-01-02T10:00:00" ; "naive")]
    #[test_case("2021-01-02T10:00:00Z" ; "zulu")]
    #[test_case("2021-01-02T10:00:00.000000Z" ; "bookmark format")]
    #[test_case("2021-01-02T11:00:00+01:00" ; "rfc3339 offset")]
    #[test_case("2021-01-02T11:00:00+0100" ; "offset without colon")]
    #[test_case("2021-01-02 10:00:00" ; "space separated")]
    fn test_parse_datetime_variants(input: &str) {
        let expected = Utc.with_ymd_and_hms(2021, 1, 2, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime(input), Some(expected));
    }

    #[test]
    fn test_parse_date_only() {
        let expected = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_datetime("2021-01-01"), Some(expected));
    }

    #[test]
    fn test_parse_fractional_seconds() {
        let dt = parse_datetime("2021-01-02T10:00:00.250").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2021-13-45T10:00:00").is_none());
    }

    #[test]
    fn test_format_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2021, 1, 2, 10, 0, 0).unwrap();
        let formatted = format_datetime(&dt);
        assert_eq!(formatted, "2021-01-02T10:00:00.000000Z");
        assert_eq!(parse_datetime(&formatted), Some(dt));
    }

    #[test]
    fn test_format_report_date() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 9).unwrap();
        assert_eq!(format_report_date(date), "2021-03-09");
    }
}
