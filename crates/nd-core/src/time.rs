//! Timestamp parsing and formatting helpers.
//!
//! Input timestamps arrive as loosely formatted ISO-8601 strings. Everything
//! is normalized to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Parse an item timestamp.
///
/// RFC 3339 is tried first. Otherwise a trailing `Z` is stripped and the
/// remainder is read as a naive UTC date-time or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    let stripped = trimmed.trim_end_matches(['Z', 'z']);
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(stripped, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a UTC instant as ISO-8601 with second precision.
pub fn to_iso8601(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar-day label (`YYYY-MM-DD`) for an instant.
pub fn day_label(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Hours elapsed from `then` to `now`; negative when `then` is in the future.
pub fn hours_between(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - then).num_seconds() as f64 / 3600.0
}
