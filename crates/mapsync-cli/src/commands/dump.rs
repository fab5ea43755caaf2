use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use mapsync_core::db::{MarkerStore, SqliteMarkerStore};
use mapsync_core::export::{parse_response_fields, write_csv};

use crate::commands::common::open_database;
use crate::error::CliError;

pub fn run_dump(
    field_args: &[String],
    output_path: Option<&Path>,
    db_path: &Path,
) -> Result<(), CliError> {
    let fields = parse_response_fields(field_args)?;

    let db = open_database(db_path)?;
    let markers = SqliteMarkerStore::new(db.connection()).list_markers()?;
    tracing::debug!("Dumping {} stored markers", markers.len());

    if let Some(path) = output_path {
        write_csv(markers, &fields, BufWriter::new(File::create(path)?))?;
        println!("{}", path.display());
    } else {
        write_csv(markers, &fields, io::stdout().lock())?;
    }

    Ok(())
}
