//! Database layer for mapsync

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{MarkerStore, SqliteMarkerStore};
