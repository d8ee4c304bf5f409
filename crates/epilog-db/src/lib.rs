//! Storage layer for the seizure log tracker.
//!
//! Provides persistence for log records using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g., `2024-10-17T14:30:00Z`).
//! This format is used by `chrono::DateTime<Utc>` serialization and ensures:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC)

use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use epilog_core::{LogKind, LogRecord, UnknownLogKind};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for log {log_id}: {timestamp}")]
    TimestampParse {
        log_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored log kind is not a recognized category.
    #[error("invalid kind for log {log_id}")]
    UnknownKind {
        log_id: String,
        #[source]
        source: UnknownLogKind,
    },
}

/// Per-kind record count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindCount {
    pub kind: LogKind,
    pub count: u64,
}

/// Raw row before timestamp/kind parsing.
struct RawLog {
    id: String,
    occurred_at: String,
    kind: String,
    name: Option<String>,
    intensity: Option<u8>,
    duration_seconds: Option<u32>,
}

impl RawLog {
    fn into_record(self) -> Result<LogRecord, DbError> {
        let occurred_at = DateTime::parse_from_rfc3339(&self.occurred_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| DbError::TimestampParse {
                log_id: self.id.clone(),
                timestamp: self.occurred_at.clone(),
                source,
            })?;
        let kind = LogKind::from_str(&self.kind).map_err(|source| DbError::UnknownKind {
            log_id: self.id.clone(),
            source,
        })?;
        Ok(LogRecord {
            id: self.id,
            occurred_at,
            kind,
            name: self.name,
            intensity: self.intensity,
            duration_seconds: self.duration_seconds,
        })
    }
}

/// Formats a timestamp for storage.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

const SELECT_COLUMNS: &str = "id, occurred_at, kind, name, intensity, duration_seconds";

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS logs (
                id TEXT PRIMARY KEY,
                occurred_at TEXT NOT NULL,
                kind TEXT NOT NULL,
                name TEXT,
                intensity INTEGER,
                duration_seconds INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_logs_occurred_at ON logs(occurred_at);
            CREATE INDEX IF NOT EXISTS idx_logs_kind ON logs(kind);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of logs, ignoring duplicates by ID.
    ///
    /// Returns the number of rows actually inserted.
    pub fn insert_logs(&mut self, logs: &[LogRecord]) -> Result<usize, DbError> {
        if logs.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO logs
                (id, occurred_at, kind, name, intensity, duration_seconds)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for log in logs {
                inserted += stmt.execute(params![
                    log.id,
                    format_timestamp(log.occurred_at),
                    log.kind.as_str(),
                    log.name,
                    log.intensity,
                    log.duration_seconds,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = logs.len(), "inserted logs");
        Ok(inserted)
    }

    /// Lists all logs ordered by timestamp then ID.
    pub fn list_logs(&self) -> Result<Vec<LogRecord>, DbError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM logs ORDER BY occurred_at ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_raw)?;
        collect_records(rows)
    }

    /// Lists logs within a time range.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn list_logs_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LogRecord>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        let sql = format!(
            "
            SELECT {SELECT_COLUMNS} FROM logs
            WHERE occurred_at >= ? AND occurred_at < ?
            ORDER BY occurred_at ASC, id ASC
            "
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([format_timestamp(start), format_timestamp(end)], row_to_raw)?;
        collect_records(rows)
    }

    /// Counts records per kind, ordered by kind string.
    pub fn count_by_kind(&self) -> Result<Vec<KindCount>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT kind, COUNT(*) AS n
            FROM logs
            GROUP BY kind
            ORDER BY kind ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(0)?;
            let count: u64 = row.get(1)?;
            Ok((kind, count))
        })?;
        let mut counts = Vec::new();
        for row in rows {
            let (kind, count) = row?;
            let kind = LogKind::from_str(&kind).map_err(|source| DbError::UnknownKind {
                log_id: "(aggregate)".to_string(),
                source,
            })?;
            counts.push(KindCount { kind, count });
        }
        Ok(counts)
    }

    /// Returns the most recent log timestamp, if any logs exist.
    pub fn last_log_time(&self) -> Result<Option<DateTime<Utc>>, DbError> {
        let timestamp: Option<String> = self
            .conn
            .query_row("SELECT MAX(occurred_at) FROM logs", [], |row| row.get(0))
            .optional()?
            .flatten();
        match timestamp {
            None => Ok(None),
            Some(timestamp) => {
                let parsed = DateTime::parse_from_rfc3339(&timestamp)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|source| DbError::TimestampParse {
                        log_id: "(aggregate)".to_string(),
                        timestamp,
                        source,
                    })?;
                Ok(Some(parsed))
            }
        }
    }
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawLog> {
    Ok(RawLog {
        id: row.get(0)?,
        occurred_at: row.get(1)?,
        kind: row.get(2)?,
        name: row.get(3)?,
        intensity: row.get(4)?,
        duration_seconds: row.get(5)?,
    })
}

fn collect_records(
    rows: impl Iterator<Item = rusqlite::Result<RawLog>>,
) -> Result<Vec<LogRecord>, DbError> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn seizure(id: &str, occurred_at: DateTime<Utc>, duration: Option<u32>) -> LogRecord {
        LogRecord::seizure(id, occurred_at, duration, Some(4)).expect("valid fixture")
    }

    #[test]
    fn insert_and_list_roundtrip() {
        let mut db = Database::open_in_memory().unwrap();
        let logs = vec![
            seizure("b", at(10, 16, 14), Some(120)),
            LogRecord::medication("a", at(10, 15, 8), "keppra").unwrap(),
        ];

        let inserted = db.insert_logs(&logs).unwrap();
        assert_eq!(inserted, 2);

        let listed = db.list_logs().unwrap();
        assert_eq!(listed.len(), 2);
        // Ordered by timestamp, not insertion order.
        assert_eq!(listed[0].id, "a");
        assert_eq!(listed[1], logs[0]);
    }

    #[test]
    fn insert_ignores_duplicate_ids() {
        let mut db = Database::open_in_memory().unwrap();
        let log = seizure("dup", at(10, 16, 14), Some(120));

        assert_eq!(db.insert_logs(&[log.clone()]).unwrap(), 1);
        assert_eq!(db.insert_logs(&[log]).unwrap(), 0);
        assert_eq!(db.list_logs().unwrap().len(), 1);
    }

    #[test]
    fn insert_empty_batch_is_noop() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.insert_logs(&[]).unwrap(), 0);
    }

    #[test]
    fn range_query_is_half_open() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_logs(&[
            seizure("before", at(10, 13, 23), None),
            seizure("at-start", at(10, 14, 0), None),
            seizure("inside", at(10, 17, 12), None),
            seizure("at-end", at(10, 21, 0), None),
        ])
        .unwrap();

        let logs = db.list_logs_in_range(at(10, 14, 0), at(10, 21, 0)).unwrap();
        let ids: Vec<&str> = logs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["at-start", "inside"]);
    }

    #[test]
    fn range_query_empty_for_inverted_bounds() {
        let db = Database::open_in_memory().unwrap();
        let logs = db.list_logs_in_range(at(10, 21, 0), at(10, 14, 0)).unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn count_by_kind_groups_records() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_logs(&[
            seizure("s1", at(10, 14, 9), Some(60)),
            seizure("s2", at(10, 15, 9), None),
            LogRecord::medication("m1", at(10, 15, 8), "keppra").unwrap(),
        ])
        .unwrap();

        let counts = db.count_by_kind().unwrap();
        assert_eq!(
            counts,
            vec![
                KindCount {
                    kind: LogKind::Medication,
                    count: 1
                },
                KindCount {
                    kind: LogKind::Seizure,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn last_log_time_tracks_most_recent() {
        let mut db = Database::open_in_memory().unwrap();
        assert_eq!(db.last_log_time().unwrap(), None);

        db.insert_logs(&[
            seizure("old", at(10, 14, 9), None),
            seizure("new", at(10, 17, 21), None),
        ])
        .unwrap();
        assert_eq!(db.last_log_time().unwrap(), Some(at(10, 17, 21)));
    }

    #[test]
    fn unknown_stored_kind_surfaces_typed_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO logs (id, occurred_at, kind) VALUES ('bad', '2024-10-17T00:00:00Z', 'aura')",
                [],
            )
            .unwrap();

        let err = db.list_logs().unwrap_err();
        assert!(matches!(err, DbError::UnknownKind { .. }));
    }

    #[test]
    fn malformed_timestamp_surfaces_typed_error() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO logs (id, occurred_at, kind) VALUES ('bad', 'not-a-date', 'seizure')",
                [],
            )
            .unwrap();

        let err = db.list_logs().unwrap_err();
        assert!(matches!(err, DbError::TimestampParse { .. }));
    }

    #[test]
    fn open_on_disk_persists_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epilog.db");

        {
            let mut db = Database::open(&path).unwrap();
            db.insert_logs(&[seizure("s1", at(10, 14, 9), Some(30))])
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let logs = db.list_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, "s1");
        assert_eq!(logs[0].duration_seconds, Some(30));
    }
}
