use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use epilog_cli::commands::{calendar, events, insights, log, status};
use epilog_cli::{Cli, Commands, Config};
use epilog_core::Timeframe;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(epilog_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = epilog_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let mut stdout = std::io::stdout();

    match &cli.command {
        Some(Commands::Log { entry }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            log::run(&mut stdout, &mut db, entry, Utc::now())?;
        }
        Some(Commands::Events { after, before }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            events::run(&mut stdout, &db, after.as_deref(), before.as_deref())?;
        }
        Some(Commands::Insights {
            monthly,
            yearly,
            date,
            json,
        }) => {
            let timeframe = if *yearly {
                Timeframe::Yearly
            } else if *monthly {
                Timeframe::Monthly
            } else {
                Timeframe::Weekly
            };
            let (db, _config) = open_database(cli.config.as_deref())?;
            insights::run(&mut stdout, &db, timeframe, *date, *json, Utc::now())?;
        }
        Some(Commands::Calendar { date }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            calendar::run(&mut stdout, &db, *date, Utc::now())?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config.database_path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
