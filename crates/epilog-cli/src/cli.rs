//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Local-first seizure and medication log tracker.
///
/// Records seizures, medication intake, and symptoms, and reports
/// aggregated insights over weekly, monthly, or yearly windows.
#[derive(Debug, Parser)]
#[command(name = "epilog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a new log entry.
    Log {
        #[command(subcommand)]
        entry: LogEntry,
    },

    /// Output stored logs as JSONL.
    Events {
        /// Only logs at or after this RFC 3339 timestamp.
        #[arg(long)]
        after: Option<String>,

        /// Only logs before this RFC 3339 timestamp.
        #[arg(long)]
        before: Option<String>,
    },

    /// Show aggregated insights for a reporting window.
    Insights {
        /// Report on the calendar month containing the reference date.
        #[arg(long, conflicts_with = "yearly")]
        monthly: bool,

        /// Report on the calendar year containing the reference date.
        #[arg(long)]
        yearly: bool,

        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show per-day log counts for a calendar month.
    Calendar {
        /// Reference date (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show database status.
    Status,
}

/// Log entry types that can be recorded.
#[derive(Debug, Subcommand)]
pub enum LogEntry {
    /// Record a seizure.
    Seizure {
        /// When the seizure occurred (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<String>,

        /// Seizure duration in seconds.
        #[arg(long)]
        duration: Option<u32>,

        /// Severity on a 1-10 scale.
        #[arg(long)]
        intensity: Option<u8>,
    },

    /// Record a medication intake.
    Med {
        /// Medication name.
        #[arg(long)]
        name: String,

        /// When the medication was taken (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// Record a symptom.
    Symptom {
        /// Symptom description.
        #[arg(long)]
        name: String,

        /// When the symptom occurred (RFC 3339). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
}
