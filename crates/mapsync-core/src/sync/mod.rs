//! Reconcile the local marker store with the remote map listing.
//!
//! A stored marker stays replaceable while its stored copy is editable and
//! becomes immutable once stored with `editable = false`. Markers missing from
//! the remote listing are reported but never removed.

use std::collections::{BTreeSet, HashMap};

use tokio_util::sync::CancellationToken;

use crate::db::MarkerStore;
use crate::error::{Error, Operation, Result};
use crate::models::{Marker, MarkerId};

/// Where remote markers come from.
#[allow(async_fn_in_trait)]
pub trait MarkerSource {
    /// List remote markers, without responses
    async fn list_markers(&self, cancel: &CancellationToken) -> Result<Vec<Marker>>;

    /// Replace `marker.responses` with the remote's normalized responses
    async fn fill_responses(&self, marker: &mut Marker, cancel: &CancellationToken) -> Result<()>;
}

/// Outcome of one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Markers fetched and written, in remote listing order
    pub synced: Vec<MarkerId>,
    /// Markers left alone because their stored copy is finalized
    pub skipped: Vec<MarkerId>,
    /// Stored markers the remote no longer lists (kept in the store)
    pub absent_from_remote: BTreeSet<MarkerId>,
}

/// Run one sync: fetch the remote listing and replace every marker whose
/// stored copy is missing or still editable.
///
/// Markers are processed one at a time in listing order. The first failure
/// stops the run; markers written before it stay written.
pub async fn sync_markers<S, C>(
    store: &S,
    source: &C,
    cancel: &CancellationToken,
) -> Result<SyncReport>
where
    S: MarkerStore,
    C: MarkerSource,
{
    ensure_active(cancel)?;
    let stored = store
        .list_markers()
        .map_err(|error| Error::context("gathering stored markers", error))?;
    let finalized: HashMap<MarkerId, bool> = stored
        .iter()
        .map(|marker| (marker.id, marker.is_finalized()))
        .collect();

    let remote = source
        .list_markers(cancel)
        .await
        .map_err(|error| Error::context("fetching remote markers", error))?;

    let mut report = SyncReport {
        absent_from_remote: absent_marker_ids(&stored, &remote),
        ..SyncReport::default()
    };

    for mut marker in remote {
        // The stored flag decides, even if the remote still reports the marker as editable
        if finalized.get(&marker.id).copied().unwrap_or(false) {
            tracing::debug!("Skipping finalized marker {}", marker.id);
            report.skipped.push(marker.id);
            continue;
        }

        let id = marker.id;
        source
            .fill_responses(&mut marker, cancel)
            .await
            .map_err(|error| Error::for_marker(id, Operation::FillResponses, error))?;

        ensure_active(cancel).map_err(|error| Error::for_marker(id, Operation::Store, error))?;
        store
            .sync_marker(&marker)
            .map_err(|error| Error::for_marker(id, Operation::Store, error))?;

        tracing::debug!(
            "Synced marker {} ({} responses, editable={})",
            id,
            marker.responses.len(),
            marker.editable
        );
        report.synced.push(id);
    }

    tracing::info!(
        "Sync finished: {} synced, {} finalized skipped, {} no longer listed",
        report.synced.len(),
        report.skipped.len(),
        report.absent_from_remote.len()
    );
    Ok(report)
}

/// IDs of stored markers that the remote listing no longer contains.
pub fn absent_marker_ids(stored: &[Marker], remote: &[Marker]) -> BTreeSet<MarkerId> {
    let listed: BTreeSet<MarkerId> = remote.iter().map(|marker| marker.id).collect();
    stored
        .iter()
        .map(|marker| marker.id)
        .filter(|id| !listed.contains(id))
        .collect()
}

fn ensure_active(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}
