//! mapsync-core - Core library for mapsync
//!
//! Mirrors markers from a civic-engagement web map into a local `SQLite`
//! store and flattens the store into CSV. Used by the `mapsync` CLI.

pub mod client;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod sync;

pub use client::MapClient;
pub use error::{Error, ErrorKind, Result};
pub use models::{Marker, MarkerId, MarkerResponse};
pub use sync::{sync_markers, SyncReport};
