//! Timestamp normalization for provider date strings.
//!
//! Providers emit ISO 8601 timestamps with irregularities that a strict
//! parser rejects: microsecond or nanosecond precision, and numeric zone
//! offsets where a literal `Z` is expected. The rewrites here are pure string
//! transforms applied before handing the value to `chrono`.
//!
//! ```
//! use cloudwire_core::date::normalize;
//!
//! assert_eq!(normalize("2009-03-12T02:00:07.123456Z"), "2009-03-12T02:00:07.123Z");
//! assert_eq!(normalize("2009-03-12T02:00:07+02:00"), "2009-03-12T02:00:07Z");
//! assert_eq!(normalize("2009-03-12T02:00:07.000Z"), "2009-03-12T02:00:07.000Z");
//! ```

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

/// Fractional seconds with at least six digits. Group 1 keeps the millisecond prefix.
static NANOS_TO_MILLIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?\.[0-9]{3})[0-9]{3,}").expect("static regex is valid")
});

/// A trailing numeric zone offset (`+HH:MM` or `-HHMM`), optionally followed by `Z`.
static TZ_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*[0-9])[+-][0-9]{2}:?[0-9]{2}Z?$").expect("static regex is valid")
});

static ZERO_SECOND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-2][0-9]:00$").expect("static regex is valid"));

/// Length of a timestamp that still carries a `:00` offset tail after [`trim_tz`].
const OFFSET_TAIL_LEN: usize = 25;

/// Error returned when a timestamp cannot be parsed even after normalization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timestamp '{input}': {reason}")]
pub struct DateParseError {
    /// The raw input as received from the provider.
    pub input: String,
    /// Parser diagnostic.
    pub reason: String,
}

/// Truncate sub-millisecond precision and force a UTC marker.
///
/// Anything following the fractional digits (a `Z` or an offset) is replaced
/// with `Z`. Strings with three or fewer fractional digits are returned as-is.
#[must_use]
pub fn trim_nanos_to_millis(input: &str) -> String {
    match NANOS_TO_MILLIS.captures(input) {
        Some(caps) => format!("{}Z", &caps[1]),
        None => input.to_owned(),
    }
}

/// Collapse a numeric zone offset into a literal `Z`.
#[must_use]
pub fn trim_tz(input: &str) -> String {
    let mut out = match TZ_OFFSET.captures(input) {
        Some(caps) => format!("{}Z", &caps[1]),
        None => input.to_owned(),
    };
    if out.len() == OFFSET_TAIL_LEN && ZERO_SECOND.is_match(&out) {
        out.truncate(OFFSET_TAIL_LEN - 6);
        out.push('Z');
    }
    out
}

/// Apply [`trim_nanos_to_millis`] then [`trim_tz`].
#[must_use]
pub fn normalize(input: &str) -> String {
    trim_tz(&trim_nanos_to_millis(input.trim()))
}

/// Normalize and parse a provider timestamp into UTC.
///
/// # Errors
///
/// Returns [`DateParseError`] if the normalized string is not a recognizable
/// ISO 8601 date-time.
pub fn parse_iso8601(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let normalized = normalize(input);
    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.fZ")
                .map(|ndt| ndt.and_utc())
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| DateParseError {
            input: input.to_owned(),
            reason: e.to_string(),
        })
}

/// Render a timestamp in the RFC 1123 form used by the HTTP `Date` header.
#[must_use]
pub fn format_http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_should_truncate_microseconds_to_millis() {
        assert_eq!(
            trim_nanos_to_millis("2009-03-12T02:00:07.123456Z"),
            "2009-03-12T02:00:07.123Z"
        );
        assert_eq!(
            trim_nanos_to_millis("2009-03-12T02:00:07.123456789"),
            "2009-03-12T02:00:07.123Z"
        );
    }

    #[test]
    fn test_should_collapse_offsets_to_utc_marker() {
        assert_eq!(trim_tz("2009-03-12T02:00:07+02:00"), "2009-03-12T02:00:07Z");
        assert_eq!(trim_tz("2009-03-12T02:00:07-0500"), "2009-03-12T02:00:07Z");
        assert_eq!(trim_tz("2009-03-12T02:00:07+02:00Z"), "2009-03-12T02:00:07Z");
        assert_eq!(
            trim_tz("2009-03-12T02:00:07.250-0500"),
            "2009-03-12T02:00:07.250Z"
        );
    }

    #[test]
    fn test_should_leave_canonical_timestamps_untouched() {
        for ts in [
            "2009-03-12T02:00:07.000Z",
            "2009-03-12T02:00:09Z",
            "2009-03-12",
            "2009-03-12T02:00:07.123",
        ] {
            assert_eq!(normalize(ts), ts);
        }
    }

    #[test]
    fn test_should_be_idempotent() {
        for ts in [
            "2009-03-12T02:00:07.123456Z",
            "2009-03-12T02:00:07+02:00",
            "2009-03-12T02:00:07.1234567-0800",
            "2009-03-12T02:00:07.000Z",
            "2010-01-01T00:00:00-00:00",
        ] {
            let once = normalize(ts);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {ts}");
        }
    }

    #[test]
    fn test_should_parse_normalized_timestamp() {
        let parsed = parse_iso8601("2009-03-12T02:00:07.000Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2009, 3, 12, 2, 0, 7).unwrap());

        let parsed = parse_iso8601("2009-03-12T02:00:07.123456Z").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn test_should_reject_garbage_timestamp() {
        let err = parse_iso8601("yesterday").unwrap_err();
        assert_eq!(err.input, "yesterday");
    }

    #[test]
    fn test_should_format_http_date() {
        let at = Utc.with_ymd_and_hms(2026, 2, 28, 12, 0, 0).unwrap();
        assert_eq!(format_http_date(at), "Sat, 28 Feb 2026 12:00:00 GMT");
    }
}
