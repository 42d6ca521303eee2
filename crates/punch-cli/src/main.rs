use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use punch_core::{PunchKind, WorkerId};
use tracing_subscriber::EnvFilter;

use punch_cli::commands::{export, punch, report, schedule, status};
use punch_cli::{Cli, Commands, Config, ScheduleAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(punch_store::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db =
        punch_store::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn resolve_worker(cli: &Cli, config: &Config) -> Result<WorkerId> {
    let name = cli.worker.as_ref().unwrap_or(&config.worker);
    WorkerId::new(name.clone()).with_context(|| format!("invalid worker name: {name}"))
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

    let now = Utc::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::In) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            punch::run(&mut out, &db, &worker, PunchKind::Entry, now)?;
        }
        Some(Commands::Pause) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            punch::run(&mut out, &db, &worker, PunchKind::PauseStart, now)?;
        }
        Some(Commands::Resume) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            punch::run(&mut out, &db, &worker, PunchKind::PauseEnd, now)?;
        }
        Some(Commands::Out) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            punch::run(&mut out, &db, &worker, PunchKind::Exit, now)?;
        }
        Some(Commands::Status { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            status::run(&mut out, &db, &worker, *json, now)?;
        }
        Some(Commands::Report {
            week: _,
            last_week,
            month,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            let period = if *last_week {
                report::Period::LastWeek
            } else if *month {
                report::Period::Month
            } else {
                report::Period::Week
            };
            let options = config.aggregate_options();
            report::run(&mut out, &db, &worker, period, *json, &options, now)?;
        }
        Some(Commands::Export { month, format }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            let period = if *month {
                report::Period::Month
            } else {
                report::Period::Week
            };
            export::run(&mut out, &db, &worker, period, *format, now)?;
        }
        Some(Commands::Schedule { action }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let worker = resolve_worker(&cli, &config)?;
            match action {
                ScheduleAction::Show => schedule::show(&mut out, &db, &worker)?,
                ScheduleAction::Set {
                    entry,
                    exit,
                    pause_start,
                    pause_end,
                    pause_minutes,
                } => schedule::set(
                    &mut out,
                    &db,
                    &worker,
                    entry,
                    exit,
                    pause_start.as_deref(),
                    pause_end.as_deref(),
                    *pause_minutes,
                    now,
                )?,
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(out)?;
        }
    }

    Ok(())
}
