use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mapsync")]
#[command(about = "Mirror civic-engagement map markers into SQLite and export them as CSV")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to local database file (default: data.db)
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch new and still-editable markers from a map into the database
    Sync {
        /// Map base URL, e.g. https://www.shapeyourcityhalifax.ca/project/maps/project
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
    },
    /// Write stored markers as CSV
    Dump {
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Response columns as NAME PATTERN pairs, e.g. your_comment '^Your Comment'
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "NAME PATTERN")]
        fields: Vec<String>,
    },
}
