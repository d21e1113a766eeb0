//! `job-listings` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`  — start the HTTP service.
//! - `export` — print the job list (or the bare postings) as JSON.
//!
//! Connection settings are loaded once here and injected into the
//! repository: from the TOML file given by `--config` / `JOBS_DB_CONFIG`,
//! otherwise from the `PG*` environment variables.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use db::{DbConfig, JobRepository, JobStore, PgConnector};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "job-listings",
    about = "Read-only job listings service",
    version
)]
struct Cli {
    /// Verbose logging (ignored when RUST_LOG is set).
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP service.
    Serve {
        #[arg(long, env = "JOBS_BIND", default_value = "0.0.0.0:5000")]
        bind: String,

        /// TOML settings file with a [postgresql] table.
        #[arg(long, env = "JOBS_DB_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Fetch once and print the result as a JSON array.
    Export {
        #[arg(long, env = "JOBS_DB_CONFIG")]
        config: Option<PathBuf>,

        /// Only the base posting columns, without the join.
        #[arg(long)]
        postings_only: bool,
    },
}

fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr keeps `export` output on stdout clean.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
}

fn load_settings(path: Option<&Path>) -> Result<DbConfig> {
    let config = match path {
        Some(path) => db::load_config(path)
            .with_context(|| format!("loading database settings from {}", path.display()))?,
        None => db::load_config_from_env().context("loading database settings from PG* environment")?,
    };
    info!(host = %config.host, port = config.port, dbname = %config.dbname, "database settings loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug)?;

    match cli.command {
        Command::Serve { bind, config } => {
            let settings = load_settings(config.as_deref())?;
            let store = JobRepository::new(PgConnector::new(settings));
            info!("Starting API server on {bind}");
            api::serve(&bind, Arc::new(store)).await?;
        }
        Command::Export {
            config,
            postings_only,
        } => {
            let settings = load_settings(config.as_deref())?;
            let store = JobRepository::new(PgConnector::new(settings));
            let json = if postings_only {
                serde_json::to_string_pretty(&store.fetch_job_postings_only().await?)?
            } else {
                serde_json::to_string_pretty(&store.fetch_all_jobs().await?)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
