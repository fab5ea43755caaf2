//! Marker repository implementation

use crate::error::Result;
use crate::models::{Marker, MarkerId, MarkerResponse};
use rusqlite::{params, Connection};

/// Trait for marker storage operations
pub trait MarkerStore {
    /// List every stored marker with its responses attached
    fn list_markers(&self) -> Result<Vec<Marker>>;

    /// Replace the stored copy of a marker and all of its responses atomically
    fn sync_marker(&self, marker: &Marker) -> Result<()>;
}

/// `SQLite` implementation of `MarkerStore`
pub struct SqliteMarkerStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteMarkerStore<'a> {
    /// Create a new store with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a marker from the leading columns of a joined row
    fn parse_marker(row: &rusqlite::Row<'_>) -> rusqlite::Result<Marker> {
        Ok(Marker {
            id: MarkerId(row.get(0)?),
            url: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            address: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            category: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            created_at: row.get(4)?,
            editable: row.get::<_, Option<bool>>(5)?.unwrap_or_default(),
            latitude: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
            longitude: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            user: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            response_url: String::new(),
            responses: Vec::new(),
        })
    }

    /// Parse the trailing response columns; `None` for markers without responses
    fn parse_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<Option<MarkerResponse>> {
        let Some(mode) = row.get::<_, Option<String>>(9)? else {
            return Ok(None);
        };

        Ok(Some(MarkerResponse {
            mode,
            question_type: row.get(10)?,
            question: row.get(11)?,
            answer: row.get::<_, Option<Vec<u8>>>(12)?.unwrap_or_default(),
        }))
    }
}

impl MarkerStore for SqliteMarkerStore<'_> {
    fn list_markers(&self) -> Result<Vec<Marker>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.id, m.url, m.address, m.category, m.created_at, m.editable,
                    m.lat, m.lng, m.user,
                    r.mode, r.question_type, r.question, r.answer
             FROM markers m
             LEFT OUTER JOIN responses r ON r.marker_id = m.id
             ORDER BY m.id, r.rowid",
        )?;

        let mut markers: Vec<Marker> = Vec::new();
        let mut rows = stmt.query([])?;

        while let Some(row) = rows.next()? {
            let id = MarkerId(row.get(0)?);
            if markers.last().map(|marker| marker.id) != Some(id) {
                markers.push(Self::parse_marker(row)?);
            }

            if let Some(response) = Self::parse_response(row)? {
                if let Some(marker) = markers.last_mut() {
                    marker.responses.push(response);
                }
            }
        }

        Ok(markers)
    }

    fn sync_marker(&self, marker: &Marker) -> Result<()> {
        // Rolled back on drop unless committed
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "DELETE FROM responses WHERE marker_id = ?",
            params![marker.id.get()],
        )?;
        tx.execute("DELETE FROM markers WHERE id = ?", params![marker.id.get()])?;

        tx.execute(
            "INSERT INTO markers (id, url, address, category, created_at, editable, lat, lng, user)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                marker.id.get(),
                marker.url,
                marker.address,
                marker.category,
                marker.created_at,
                marker.editable,
                marker.latitude,
                marker.longitude,
                marker.user,
            ],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO responses (marker_id, mode, question_type, question, answer)
                 VALUES (?, ?, ?, ?, ?)",
            )?;
            for response in &marker.responses {
                insert.execute(params![
                    marker.id.get(),
                    response.mode,
                    response.question_type,
                    response.question,
                    response.answer,
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!(
            "Stored marker {} with {} responses",
            marker.id,
            marker.responses.len()
        );
        Ok(())
    }
}
