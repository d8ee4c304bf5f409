//! Status command for showing database contents at a glance.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::SecondsFormat;
use epilog_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, database_path: &Path) -> Result<()> {
    let counts = db.count_by_kind()?;

    writeln!(writer, "Epilog status")?;
    writeln!(writer, "Database: {}", database_path.display())?;

    if counts.is_empty() {
        writeln!(writer, "No logs recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Logs:")?;
    for entry in counts {
        writeln!(writer, "- {}: {}", entry.kind, entry.count)?;
    }

    if let Some(last) = db.last_log_time()? {
        writeln!(
            writer,
            "Last log: {}",
            last.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use epilog_core::LogRecord;

    #[test]
    fn status_outputs_counts_and_last_log() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("epilog.db");
        let mut db = Database::open(&db_path).unwrap();

        db.insert_logs(&[
            LogRecord::seizure(
                "s1",
                Utc.with_ymd_and_hms(2024, 10, 16, 14, 0, 0).unwrap(),
                Some(120),
                None,
            )
            .unwrap(),
            LogRecord::medication(
                "m1",
                Utc.with_ymd_and_hms(2024, 10, 17, 8, 0, 0).unwrap(),
                "keppra",
            )
            .unwrap(),
        ])
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, &db_path).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Epilog status"));
        assert!(output.contains("- meds: 1"));
        assert!(output.contains("- seizure: 1"));
        assert!(output.contains("Last log: 2024-10-17T08:00:00Z"));
    }

    #[test]
    fn status_reports_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, Path::new("/tmp/epilog.db")).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("No logs recorded."));
    }
}
