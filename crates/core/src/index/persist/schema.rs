//! SQLite schema definition.

use rusqlite::Connection;
use thiserror::Error;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema version {found} is newer than supported {supported}")]
    VersionTooNew { found: i32, supported: i32 },

    #[error("Unsupported schema version {0}")]
    Unsupported(i32),
}

/// Create the schema on a fresh database, or check the recorded version.
pub fn init_schema(conn: &Connection) -> Result<(), SchemaError> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if version > SCHEMA_VERSION {
        return Err(SchemaError::VersionTooNew { found: version, supported: SCHEMA_VERSION });
    } else if version != SCHEMA_VERSION {
        return Err(SchemaError::Unsupported(version));
    }

    Ok(())
}

pub(super) fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 =
        conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;

    Ok(version)
}

pub(super) fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute("INSERT OR REPLACE INTO schema_version (id, version) VALUES (1, ?1)", [version])?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(
        r#"
        CREATE TABLE schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL
        );

        -- One row per note; position restores snapshot order on load
        CREATE TABLE notes (
            path TEXT PRIMARY KEY,
            id TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            created TEXT NOT NULL,
            updated TEXT NOT NULL,
            content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            position INTEGER NOT NULL
        );

        CREATE INDEX idx_notes_updated ON notes(updated);

        CREATE TABLE note_tags (
            note_path TEXT NOT NULL REFERENCES notes(path) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (note_path, position)
        );

        CREATE INDEX idx_note_tags_tag ON note_tags(tag);

        CREATE TABLE note_links (
            from_path TEXT NOT NULL REFERENCES notes(path) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            to_id TEXT NOT NULL,
            PRIMARY KEY (from_path, position)
        );

        CREATE INDEX idx_note_links_target ON note_links(to_id);
        "#,
    )?;

    Ok(())
}
