use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ts_cli::commands::{export, import, report, status, util};
use ts_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ts_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ts_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so CSV and JSON output stay clean.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let today = chrono::Local::now().date_naive();

    match &cli.command {
        Some(Commands::Report { filters, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let actor = util::resolve_actor(cli.actor, &config)?;
            let request = util::fetch_request(&db, &config, filters, actor, today)?;
            report::run(&mut io::stdout().lock(), &request, *json)?;
        }
        Some(Commands::Export { filters, output }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let actor = util::resolve_actor(cli.actor, &config)?;
            let request = util::fetch_request(&db, &config, filters, actor, today)?;
            let rows = match output {
                Some(path) => {
                    let file = File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    let rows = export::run(&mut writer, &request)?;
                    writer.flush()?;
                    rows
                }
                None => export::run(io::stdout().lock(), &request)?,
            };
            tracing::debug!(rows, "exported time entries");
        }
        Some(Commands::Import) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            import::run(io::stdin().lock(), &mut io::stdout().lock(), &db)?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut io::stdout().lock(), &db, &config.database_path)?;
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
