//! Parsing of the service's training completion timestamps.
//!
//! The service formats `finished_at` loosely: RFC-3339 with an offset, ISO-8601
//! without one, or with a space instead of `T`. Timestamps carrying an offset are
//! converted to UTC; naive ones are taken to be UTC already.
//!
//! Examples
//! - "2024-03-10T09:30:00-05:00" -> 2024-03-10T14:30:00Z
//! - "2024-03-10T09:30:00.123456" -> 2024-03-10T09:30:00.123456Z
//! - "2024-03-10 09:30:00" -> 2024-03-10T09:30:00Z

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a completion timestamp into UTC.
///
/// Returns `None` when nothing matches; callers treat that as "never trained".
pub fn parse_finished_at(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // trailing "Z" without the rest of RFC-3339 (e.g. no seconds)
    let naive_src = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(naive_src, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(naive_src, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
