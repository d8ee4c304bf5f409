//! Shared helpers for subcommands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Parses an optional RFC 3339 timestamp argument.
pub fn parse_timestamp(s: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>> {
    match s {
        None => Ok(None),
        Some(s) => {
            let dt = DateTime::parse_from_rfc3339(s).with_context(|| {
                format!(
                    "invalid --{name} timestamp, expected RFC 3339 (e.g., 2024-10-17T12:00:00Z)"
                )
            })?;
            Ok(Some(dt.with_timezone(&Utc)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_to_utc() {
        let parsed = parse_timestamp(Some("2024-10-17T12:00:00+02:00"), "at").unwrap();
        assert_eq!(
            parsed,
            Some(Utc.with_ymd_and_hms(2024, 10, 17, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn none_passes_through() {
        assert_eq!(parse_timestamp(None, "at").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_timestamp() {
        let err = parse_timestamp(Some("yesterday"), "at").unwrap_err();
        assert!(err.to_string().contains("--at"));
    }
}
