//! mapsync CLI - mirror a civic-engagement map into a local database
//!
//! `mapsync sync` pulls new and still-editable markers; `mapsync dump` writes
//! the stored markers as CSV.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_db_path;
use crate::commands::dump::run_dump;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mapsync=info")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path)?;

    match cli.command {
        Commands::Sync { base_url } => run_sync(base_url, &db_path).await?,
        Commands::Dump { output, fields } => run_dump(&fields, output.as_deref(), &db_path)?,
    }

    Ok(())
}
