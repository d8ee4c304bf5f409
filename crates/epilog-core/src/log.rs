//! Log record types with validation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for log records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Seizure intensity outside the 1..=10 scale.
    #[error("intensity must be between 1 and 10, got {value}")]
    IntensityOutOfRange { value: u8 },
}

/// Canonical log categories.
///
/// The string forms match the storage format (`seizure`, `meds`, `symptom`).
/// Only [`LogKind::Seizure`] carries a duration and is the subject of
/// numeric aggregation; the other kinds are informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Seizure,
    Medication,
    Symptom,
}

impl LogKind {
    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Seizure => "seizure",
            Self::Medication => "meds",
            Self::Symptom => "symptom",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = UnknownLogKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seizure" => Ok(Self::Seizure),
            "meds" | "medication" => Ok(Self::Medication),
            "symptom" => Ok(Self::Symptom),
            _ => Err(UnknownLogKind(s.to_string())),
        }
    }
}

impl Serialize for LogKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown log kind strings.
#[derive(Debug, Clone)]
pub struct UnknownLogKind(String);

impl fmt::Display for UnknownLogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log kind: {}", self.0)
    }
}

impl std::error::Error for UnknownLogKind {}

/// A single immutable log entry.
///
/// Records are produced once and never mutated; aggregation reads them
/// and allocates fresh output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Unique record ID.
    pub id: String,

    /// When the event occurred (UTC).
    pub occurred_at: DateTime<Utc>,

    /// Event category.
    pub kind: LogKind,

    /// Medication or symptom label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Seizure severity on a 1..=10 scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,

    /// Event duration in seconds, present only for timed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
}

impl LogRecord {
    /// Creates a validated log record.
    pub fn new(
        id: impl Into<String>,
        occurred_at: DateTime<Utc>,
        kind: LogKind,
        name: Option<String>,
        intensity: Option<u8>,
        duration_seconds: Option<u32>,
    ) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "log ID" });
        }
        if let Some(name) = &name {
            if name.is_empty() {
                return Err(ValidationError::Empty { field: "name" });
            }
        }
        if let Some(value) = intensity {
            if !(1..=10).contains(&value) {
                return Err(ValidationError::IntensityOutOfRange { value });
            }
        }
        Ok(Self {
            id,
            occurred_at,
            kind,
            name,
            intensity,
            duration_seconds,
        })
    }

    /// Creates a seizure record.
    pub fn seizure(
        id: impl Into<String>,
        occurred_at: DateTime<Utc>,
        duration_seconds: Option<u32>,
        intensity: Option<u8>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            occurred_at,
            LogKind::Seizure,
            None,
            intensity,
            duration_seconds,
        )
    }

    /// Creates a medication record.
    pub fn medication(
        id: impl Into<String>,
        occurred_at: DateTime<Utc>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            occurred_at,
            LogKind::Medication,
            Some(name.into()),
            None,
            None,
        )
    }

    /// Creates a symptom record.
    pub fn symptom(
        id: impl Into<String>,
        occurred_at: DateTime<Utc>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(
            id,
            occurred_at,
            LogKind::Symptom,
            Some(name.into()),
            None,
            None,
        )
    }
}

/// An event suitable for insights aggregation.
///
/// This trait allows aggregation to work with any record
/// representation, not just [`LogRecord`].
pub trait LoggedEvent {
    /// Returns when the event occurred.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Returns the event category.
    fn kind(&self) -> LogKind;

    /// Returns the event duration in seconds, if timed.
    fn duration_seconds(&self) -> Option<u32>;
}

impl LoggedEvent for LogRecord {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    fn kind(&self) -> LogKind {
        self.kind
    }

    fn duration_seconds(&self) -> Option<u32> {
        self.duration_seconds
    }
}

/// Groups records by their UTC calendar day, preserving input order
/// within each day.
pub fn group_by_day<R: LoggedEvent>(records: &[R]) -> BTreeMap<NaiveDate, Vec<&R>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&R>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.occurred_at().date_naive())
            .or_default()
            .push(record);
    }
    grouped
}
