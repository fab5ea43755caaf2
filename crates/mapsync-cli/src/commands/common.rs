use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use mapsync_core::db::Database;

use crate::error::CliError;

pub const DB_PATH_ENV: &str = "MAPSYNC_DB_PATH";
pub const BASE_URL_ENV: &str = "MAPSYNC_BASE_URL";
pub const DEFAULT_DB_PATH: &str = "data.db";

/// Normalize optional text by trimming whitespace and removing empties.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    resolve_db_path_from(cli_db_path, env::var_os(DB_PATH_ENV))
}

pub fn resolve_db_path_from(
    cli_db_path: Option<PathBuf>,
    env_db_path: Option<OsString>,
) -> Result<PathBuf, CliError> {
    let path = cli_db_path
        .or_else(|| env_db_path.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

    if path.as_os_str().is_empty() {
        Err(CliError::EmptyDbPath)
    } else {
        Ok(path)
    }
}

pub fn resolve_base_url(cli_base_url: Option<String>) -> Result<String, CliError> {
    resolve_base_url_from(cli_base_url, env::var(BASE_URL_ENV).ok())
}

pub fn resolve_base_url_from(
    cli_base_url: Option<String>,
    env_base_url: Option<String>,
) -> Result<String, CliError> {
    normalize_text_option(cli_base_url)
        .or_else(|| normalize_text_option(env_base_url))
        .ok_or(CliError::MissingBaseUrl)
}

pub fn open_database(path: &Path) -> Result<Database, CliError> {
    Ok(Database::open(path)?)
}
