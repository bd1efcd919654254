//! Normalization of provider values into display form.
//!
//! Money arrives in minor units and timestamps as epoch seconds or ISO-8601
//! strings. Outputs carry major units and human-readable UTC dates.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{AdapterError, Result};

const DATE_FORMAT: &str = "%b %-d, %Y";
const DATE_TIME_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Convert an amount in minor units (cents) to major units.
pub fn minor_to_major(amount: i64) -> f64 {
    amount as f64 / 100.0
}

/// Format epoch seconds as a date, e.g. `Jan 15, 2026`.
pub fn epoch_to_date(secs: i64) -> Result<String> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .ok_or_else(|| AdapterError::InvalidResponse(format!("timestamp {secs} out of range")))
}

/// Format an ISO-8601 timestamp as a date.
///
/// Unparseable input is returned unchanged.
pub fn iso_to_date(value: &str) -> String {
    format_iso(value, DATE_FORMAT)
}

/// Format an ISO-8601 timestamp as a date and time, e.g. `Jan 15, 2026 10:30 AM`.
///
/// Unparseable input is returned unchanged.
pub fn iso_to_datetime(value: &str) -> String {
    format_iso(value, DATE_TIME_FORMAT)
}

fn format_iso(value: &str, format: &str) -> String {
    match parse_iso(value) {
        Some(dt) => dt.format(format).to_string(),
        None => {
            debug!("Leaving unrecognized timestamp as-is: {value}");
            value.to_string()
        }
    }
}

/// Accepts RFC 3339 and the Postgres style `2023-10-06 22:59:55.977+00`.
fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minor_to_major() {
        assert_eq!(minor_to_major(29900), 299.0);
        assert_eq!(minor_to_major(-5000), -50.0);
        assert_eq!(minor_to_major(199), 1.99);
    }

    #[test]
    fn test_epoch_to_date() {
        // 2026-01-15T12:00:00Z
        assert_eq!(epoch_to_date(1_768_478_400).unwrap(), "Jan 15, 2026");
        assert!(epoch_to_date(i64::MAX).is_err());
    }

    #[test]
    fn test_iso_formats() {
        assert_eq!(iso_to_date("2026-01-15T10:30:00Z"), "Jan 15, 2026");
        assert_eq!(iso_to_datetime("2026-01-15T10:30:00Z"), "Jan 15, 2026 10:30 AM");
        assert_eq!(
            iso_to_datetime("2026-01-14 14:15:00.123+00"),
            "Jan 14, 2026 2:15 PM"
        );
        assert_eq!(iso_to_date("2025-03-15T10:00:00.123456+00:00"), "Mar 15, 2025");
    }

    #[test]
    fn test_unparseable_passthrough() {
        assert_eq!(iso_to_date("Unknown"), "Unknown");
    }
}
