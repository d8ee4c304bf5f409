//! Seizure log tracker CLI library.
//!
//! This crate provides the CLI interface for the log tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, LogEntry};
pub use config::Config;
