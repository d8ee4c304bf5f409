//! CLI subcommand implementations.

pub mod calendar;
pub mod events;
pub mod insights;
pub mod log;
pub mod status;
mod util;
