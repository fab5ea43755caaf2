use std::path::Path;

use mapsync_core::db::SqliteMarkerStore;
use mapsync_core::{sync_markers, MapClient};
use tokio_util::sync::CancellationToken;

use crate::commands::common::{open_database, resolve_base_url};
use crate::error::CliError;

pub async fn run_sync(base_url: Option<String>, db_path: &Path) -> Result<(), CliError> {
    let base_url = resolve_base_url(base_url)?;
    let client = MapClient::new(&base_url)?;
    let db = open_database(db_path)?;
    let store = SqliteMarkerStore::new(db.connection());

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling sync");
                cancel.cancel();
            }
        }
    });

    let result = sync_markers(&store, &client, &cancel).await;
    interrupt.abort();
    let report = result?;

    println!(
        "Sync completed: {} synced, {} finalized skipped",
        report.synced.len(),
        report.skipped.len()
    );
    Ok(())
}
