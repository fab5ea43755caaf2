//! Data models for mapsync

mod marker;

pub use marker::{Marker, MarkerId, MarkerResponse, FILE_QUESTION};
