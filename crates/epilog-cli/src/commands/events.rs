//! Events command for querying the local `SQLite` database.
//!
//! This module outputs logs from the local database as JSONL for
//! debugging and export.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use epilog_db::Database;

use super::util::parse_timestamp;

/// Runs the events command, outputting logs as JSONL.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    after: Option<&str>,
    before: Option<&str>,
) -> Result<()> {
    let after = parse_timestamp(after, "after")?;
    let before = parse_timestamp(before, "before")?;

    let logs = match (after, before) {
        (None, None) => db.list_logs()?,
        (after, before) => {
            let start = after.unwrap_or(DateTime::UNIX_EPOCH);
            let end = before.unwrap_or_else(far_future);
            db.list_logs_in_range(start, end)?
        }
    };

    for log in logs {
        let json = serde_json::to_string(&log)?;
        writeln!(writer, "{json}")?;
    }

    Ok(())
}

/// Upper bound for open-ended queries. Stays within four digits so the
/// stored ISO 8601 text ordering holds.
fn far_future() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59)
        .single()
        .expect("valid constant timestamp")
}

#[cfg(test)]
mod tests {
    use super::*;
    use epilog_core::LogRecord;

    fn seed(db: &mut Database) {
        let logs = vec![
            LogRecord::seizure(
                "s1",
                Utc.with_ymd_and_hms(2024, 10, 14, 9, 0, 0).unwrap(),
                Some(60),
                None,
            )
            .unwrap(),
            LogRecord::medication(
                "m1",
                Utc.with_ymd_and_hms(2024, 10, 16, 8, 0, 0).unwrap(),
                "keppra",
            )
            .unwrap(),
        ];
        db.insert_logs(&logs).unwrap();
    }

    #[test]
    fn outputs_all_logs_as_jsonl() {
        let mut db = Database::open_in_memory().unwrap();
        seed(&mut db);

        let mut output = Vec::new();
        run(&mut output, &db, None, None).unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], "s1");
        assert_eq!(first["kind"], "seizure");
    }

    #[test]
    fn after_filter_excludes_earlier_logs() {
        let mut db = Database::open_in_memory().unwrap();
        seed(&mut db);

        let mut output = Vec::new();
        run(&mut output, &db, Some("2024-10-15T00:00:00Z"), None).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"m1\""));
    }

    #[test]
    fn before_filter_excludes_later_logs() {
        let mut db = Database::open_in_memory().unwrap();
        seed(&mut db);

        let mut output = Vec::new();
        run(&mut output, &db, None, Some("2024-10-15T00:00:00Z")).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"s1\""));
    }

    #[test]
    fn malformed_filter_errors() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        assert!(run(&mut output, &db, Some("last week"), None).is_err());
    }
}
