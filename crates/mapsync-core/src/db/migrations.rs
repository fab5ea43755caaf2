//! Database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Migration to version 1: markers and their responses
///
/// `responses` has no ON DELETE CASCADE; replacing a marker deletes its
/// responses first.
fn migrate_v1(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );
        CREATE TABLE IF NOT EXISTS markers (
            id INTEGER NOT NULL PRIMARY KEY,
            url TEXT,
            address TEXT,
            category TEXT,
            created_at TEXT,
            editable INTEGER,
            lat TEXT,
            lng TEXT,
            user TEXT
        );
        CREATE TABLE IF NOT EXISTS responses (
            marker_id INTEGER NOT NULL REFERENCES markers(id),
            mode TEXT NOT NULL,
            question_type TEXT NOT NULL,
            question TEXT NOT NULL,
            answer BLOB
        );
        CREATE INDEX IF NOT EXISTS idx_responses_marker_id ON responses(marker_id);
        INSERT INTO schema_version (version) VALUES (1);",
    )?;

    tx.commit()?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
