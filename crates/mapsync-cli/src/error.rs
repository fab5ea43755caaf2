use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] mapsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Base URL is required. Pass --base-url or set MAPSYNC_BASE_URL.")]
    MissingBaseUrl,
    #[error("Database path cannot be empty")]
    EmptyDbPath,
}
