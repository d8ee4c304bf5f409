//! Calendar command showing per-day log counts for a month.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use epilog_core::{LoggedEvent, Timeframe, group_by_day, period_bounds};
use epilog_db::Database;

/// Runs the calendar command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    date: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<()> {
    let reference = date.map_or(now, |d| {
        d.and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc()
    });
    let (start, end) = period_bounds(Timeframe::Monthly, reference);
    let logs = db.list_logs_in_range(start, end)?;

    writeln!(writer, "CALENDAR: {}", start.date_naive().format("%B %Y"))?;
    writeln!(writer)?;

    if logs.is_empty() {
        writeln!(writer, "No logs this month.")?;
        return Ok(());
    }

    for (day, entries) in group_by_day(&logs) {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for entry in entries {
            *counts.entry(entry.kind().as_str()).or_default() += 1;
        }
        let summary = counts
            .iter()
            .map(|(kind, count)| format!("{kind} x{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(writer, "{day}  {summary}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use epilog_core::LogRecord;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn lists_days_with_per_kind_counts() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_logs(&[
            LogRecord::seizure(
                "s1",
                Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap(),
                Some(60),
                None,
            )
            .unwrap(),
            LogRecord::seizure(
                "s2",
                Utc.with_ymd_and_hms(2024, 10, 15, 21, 0, 0).unwrap(),
                None,
                None,
            )
            .unwrap(),
            LogRecord::medication(
                "m1",
                Utc.with_ymd_and_hms(2024, 10, 15, 8, 0, 0).unwrap(),
                "keppra",
            )
            .unwrap(),
            LogRecord::symptom(
                "y1",
                Utc.with_ymd_and_hms(2024, 10, 3, 7, 0, 0).unwrap(),
                "fatigue",
            )
            .unwrap(),
            // Previous month, excluded
            LogRecord::seizure(
                "old",
                Utc.with_ymd_and_hms(2024, 9, 30, 9, 0, 0).unwrap(),
                None,
                None,
            )
            .unwrap(),
        ])
        .unwrap();

        let mut output = Vec::new();
        run(&mut output, &db, None, now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("CALENDAR: October 2024"));
        assert!(output.contains("2024-10-03  symptom x1"));
        assert!(output.contains("2024-10-15  meds x1, seizure x2"));
        assert!(!output.contains("2024-09-30"));
    }

    #[test]
    fn empty_month_prints_hint() {
        let db = Database::open_in_memory().unwrap();
        let mut output = Vec::new();
        run(&mut output, &db, None, now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("No logs this month."));
    }
}
