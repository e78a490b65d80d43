use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 date or date-time the way pipeline runners hand them out.
///
/// Accepts a bare date (midnight), a naive date-time with `T` or space as the
/// separator, or an RFC 3339 value with an offset. The offset is dropped and the
/// wall-clock time kept, so the calendar month is the one written in the value.
pub fn parse_iso_datetime(field: &str, value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    Err(EtlError::DateTimeParseError {
        field: field.to_string(),
        value: value.to_string(),
    })
}
