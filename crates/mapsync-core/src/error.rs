//! Error types for mapsync-core

use std::fmt;

use thiserror::Error;

use crate::models::MarkerId;

/// Result type alias using mapsync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mapsync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request could not be completed
    #[error("requesting {url:?} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request completed with a non-2xx status
    #[error("requesting {url:?} got bad status {status}")]
    Status { url: String, status: u16 },

    /// Malformed or unexpectedly shaped JSON
    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A URL supplied by the remote could not be resolved
    #[error("resolving URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid configuration (base URL, field matchers)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The run was cancelled before it finished
    #[error("operation cancelled")]
    Cancelled,

    /// Failure while handling one marker
    #[error("{operation} marker {id}: {source}")]
    Marker {
        id: MarkerId,
        operation: Operation,
        #[source]
        source: Box<Error>,
    },

    /// Failure annotated with the step that produced it
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<Error>,
    },
}

/// Coarse classification of an [`Error`], independent of the context it was wrapped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    Store,
    Io,
    Config,
    Cancelled,
}

/// The per-marker step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ResolveUrl,
    FillResponses,
    Store,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ResolveUrl => "building URL for",
            Self::FillResponses => "filling responses for",
            Self::Store => "storing",
        };
        f.write_str(label)
    }
}

impl Error {
    /// Wrap an error with the marker and step it belongs to.
    pub fn for_marker(id: MarkerId, operation: Operation, source: Self) -> Self {
        Self::Marker {
            id,
            operation,
            source: Box::new(source),
        }
    }

    /// Wrap an error with a short description of the failing step.
    pub fn context(context: &'static str, source: Self) -> Self {
        Self::Context {
            context,
            source: Box::new(source),
        }
    }

    /// Classify this error, looking through any context wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Status { .. } => ErrorKind::Transport,
            Self::Decode(_) | Self::InvalidUrl { .. } => ErrorKind::Decode,
            Self::Database(_) => ErrorKind::Store,
            Self::Io(_) | Self::Csv(_) => ErrorKind::Io,
            Self::Config(_) => ErrorKind::Config,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Marker { source, .. } | Self::Context { source, .. } => source.kind(),
        }
    }

    /// The marker this error was raised for, if any.
    pub fn marker_id(&self) -> Option<MarkerId> {
        match self {
            Self::Marker { id, .. } => Some(*id),
            Self::Context { source, .. } => source.marker_id(),
            _ => None,
        }
    }
}
