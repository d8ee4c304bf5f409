//! Log command for recording new entries.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use epilog_core::LogRecord;
use epilog_db::Database;
use uuid::Uuid;

use crate::LogEntry;

use super::util::parse_timestamp;

/// Runs the log command, inserting one record.
pub fn run<W: Write>(
    writer: &mut W,
    db: &mut Database,
    entry: &LogEntry,
    now: DateTime<Utc>,
) -> Result<()> {
    let record = build_record(entry, now)?;
    db.insert_logs(std::slice::from_ref(&record))?;
    writeln!(writer, "Logged {} {}", record.kind, record.id)?;
    Ok(())
}

fn build_record(entry: &LogEntry, now: DateTime<Utc>) -> Result<LogRecord> {
    let id = Uuid::new_v4().to_string();
    let record = match entry {
        LogEntry::Seizure {
            at,
            duration,
            intensity,
        } => {
            let at = parse_timestamp(at.as_deref(), "at")?.unwrap_or(now);
            LogRecord::seizure(id, at, *duration, *intensity)?
        }
        LogEntry::Med { name, at } => {
            let at = parse_timestamp(at.as_deref(), "at")?.unwrap_or(now);
            LogRecord::medication(id, at, name.clone())?
        }
        LogEntry::Symptom { name, at } => {
            let at = parse_timestamp(at.as_deref(), "at")?.unwrap_or(now);
            LogRecord::symptom(id, at, name.clone())?
        }
    };
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use epilog_core::LogKind;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn seizure_entry_is_persisted() {
        let mut db = Database::open_in_memory().unwrap();
        let entry = LogEntry::Seizure {
            at: Some("2024-10-16T14:00:00Z".to_string()),
            duration: Some(120),
            intensity: Some(4),
        };

        let mut output = Vec::new();
        run(&mut output, &mut db, &entry, now()).unwrap();

        let logs = db.list_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].kind, LogKind::Seizure);
        assert_eq!(logs[0].duration_seconds, Some(120));
        assert_eq!(logs[0].intensity, Some(4));

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Logged seizure "));
    }

    #[test]
    fn med_entry_defaults_to_now() {
        let mut db = Database::open_in_memory().unwrap();
        let entry = LogEntry::Med {
            name: "keppra".to_string(),
            at: None,
        };

        let mut output = Vec::new();
        run(&mut output, &mut db, &entry, now()).unwrap();

        let logs = db.list_logs().unwrap();
        assert_eq!(logs[0].kind, LogKind::Medication);
        assert_eq!(logs[0].name.as_deref(), Some("keppra"));
        assert_eq!(logs[0].occurred_at, now());
    }

    #[test]
    fn out_of_range_intensity_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let entry = LogEntry::Seizure {
            at: None,
            duration: None,
            intensity: Some(11),
        };

        let mut output = Vec::new();
        let result = run(&mut output, &mut db, &entry, now());
        assert!(result.is_err());
        assert!(db.list_logs().unwrap().is_empty());
    }

    #[test]
    fn malformed_at_is_rejected() {
        let mut db = Database::open_in_memory().unwrap();
        let entry = LogEntry::Symptom {
            name: "aura".to_string(),
            at: Some("not-a-timestamp".to_string()),
        };

        let mut output = Vec::new();
        assert!(run(&mut output, &mut db, &entry, now()).is_err());
    }
}
