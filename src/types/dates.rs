//! Best-Effort Date Handling
//!
//! Ticket sources emit dates in whatever format their administrators chose.
//! Parse failures are tolerated everywhere: the raw string is kept for
//! display, and a record with no determinable date sorts first and is never
//! excluded by the age cutoff.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime formats tried in order after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats, parsed as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Parse a source-supplied date string, trying RFC 3339 first and then the
/// common ITSM export formats. Returns `None` for anything unrecognizable.
pub fn parse_flexible(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        }
    }

    None
}

/// Sort key where unknown dates order before every real one
pub fn sort_key(raw: &str) -> NaiveDateTime {
    parse_flexible(raw).unwrap_or(NaiveDateTime::MIN)
}

/// Reformat to `YYYY-MM-DD` when parseable; the raw string passes through
/// unchanged otherwise
pub fn display_date(raw: &str) -> String {
    match parse_flexible(raw) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => raw.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_flexible("2026-03-14T09:26:53Z").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-03-14 09:26:53");
    }

    #[test]
    fn test_parse_common_formats() {
        assert!(parse_flexible("2026-03-14 09:26:53").is_some());
        assert!(parse_flexible("2026-03-14T09:26:53").is_some());
        assert!(parse_flexible("03/14/2026 09:26").is_some());
        assert!(parse_flexible("2026-03-14").is_some());
        assert!(parse_flexible("03/14/2026").is_some());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_flexible("").is_none());
        assert!(parse_flexible("   ").is_none());
        assert!(parse_flexible("next Tuesday").is_none());
        assert!(parse_flexible("14th of March").is_none());
    }

    #[test]
    fn test_sort_key_unknown_dates_first() {
        let unknown = sort_key("not a date");
        let known = sort_key("2020-01-01");
        assert!(unknown < known);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2026-03-14 09:26:53"), "2026-03-14");
        assert_eq!(display_date("03/14/2026"), "2026-03-14");
        // Unparseable strings pass through unchanged (trimmed)
        assert_eq!(display_date(" next Tuesday "), "next Tuesday");
    }
}
