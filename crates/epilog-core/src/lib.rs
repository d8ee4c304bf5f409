//! Core domain logic for the seizure log tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Log records: validated seizure/medication/symptom entries
//! - Insights: time-bucketed aggregation over a reporting window
//! - Day grouping: calendar-style per-day views of a flat record list

pub mod insights;
pub mod log;

pub use insights::{Insights, Timeframe, compute_insights, period_bounds};
pub use log::{LogKind, LogRecord, LoggedEvent, UnknownLogKind, ValidationError, group_by_day};
