use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bt_cli::commands::log::LogArgs;
use bt_cli::commands::{dashboard, delete, edit, last, log, logs, session};
use bt_cli::{Cli, Commands, Config, StartSession};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(bt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = bt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays parseable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let now = Utc::now();
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Log {
            kind,
            by,
            detail,
            weight,
            height,
            comment,
            at,
            end,
        } => {
            let args = LogArgs {
                by,
                detail,
                weight,
                height,
                comment,
                at,
                end,
            };
            log::run(&mut out, &mut db, kind, args, now, config.tz()?)?;
        }
        Commands::Edit {
            id,
            kind,
            by,
            detail,
            weight,
            height,
            comment,
            at,
            end,
        } => {
            let args = LogArgs {
                by,
                detail,
                weight,
                height,
                comment,
                at,
                end,
            };
            edit::run(&mut out, &mut db, id, kind, args, now, config.tz()?)?;
        }
        Commands::Start { session: which } => match which {
            StartSession::Feeding { side } => {
                session::start_feeding(&mut out, &mut db, side, now, config.tz()?)?;
            }
            StartSession::Sleep => session::start_sleep(&mut out, &mut db, now, config.tz()?)?,
        },
        Commands::Stop { session: which } => session::stop(&mut out, &mut db, which, now)?,
        Commands::Logs {
            kind,
            skip,
            limit,
            json,
        } => logs::run(&mut out, &db, kind, skip, limit, json, config.tz()?)?,
        Commands::Delete { id } => delete::run(&mut out, &mut db, id)?,
        Commands::Last { what } => last::run(&mut out, &db, what, now)?,
        Commands::Dashboard { json } => {
            dashboard::run(&mut out, &db, &config.engine_config()?, now, json)?;
        }
    }

    out.flush()?;
    Ok(())
}
