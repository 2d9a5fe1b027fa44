//! SQLite backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params};
use tracing::debug;

use super::schema::init_schema;
use super::{Persistence, PersistenceError, ensure_parent};
use crate::note::NoteRecord;

/// Notes, tags and links in relational tables.
///
/// A save replaces every row inside one transaction.
pub struct SqlitePersistence {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqlitePersistence {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, PersistenceError> {
        ensure_parent(path)?;
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn), path: Some(path.to_path_buf()) })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn), path: None })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Persistence for SqlitePersistence {
    fn load(&self) -> Result<Vec<NoteRecord>, PersistenceError> {
        let conn = self.conn();

        let mut tags = grouped(&conn, "SELECT note_path, tag FROM note_tags ORDER BY note_path, position")?;
        let mut links =
            grouped(&conn, "SELECT from_path, to_id FROM note_links ORDER BY from_path, position")?;

        let mut stmt = conn.prepare(
            "SELECT id, path, title, created, updated, content, content_hash
             FROM notes ORDER BY position",
        )?;
        let records = stmt
            .query_map([], |row| {
                let path: String = row.get(1)?;
                Ok(NoteRecord {
                    id: row.get(0)?,
                    tags: tags.remove(&path).unwrap_or_default(),
                    links: links.remove(&path).unwrap_or_default(),
                    path,
                    title: row.get(2)?,
                    created: row.get(3)?,
                    updated: row.get(4)?,
                    content: row.get(5)?,
                    content_hash: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn save(&self, records: &[NoteRecord]) -> Result<(), PersistenceError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute_batch("DELETE FROM note_links; DELETE FROM note_tags; DELETE FROM notes;")?;
        {
            let mut insert_note = tx.prepare(
                "INSERT INTO notes (path, id, title, created, updated, content, content_hash, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            let mut insert_tag =
                tx.prepare("INSERT INTO note_tags (note_path, position, tag) VALUES (?1, ?2, ?3)")?;
            let mut insert_link = tx
                .prepare("INSERT INTO note_links (from_path, position, to_id) VALUES (?1, ?2, ?3)")?;

            for (position, r) in records.iter().enumerate() {
                insert_note.execute(params![
                    r.path,
                    r.id,
                    r.title,
                    r.created,
                    r.updated,
                    r.content,
                    r.content_hash,
                    position as i64,
                ])?;
                for (i, tag) in r.tags.iter().enumerate() {
                    insert_tag.execute(params![r.path, i as i64, tag])?;
                }
                for (i, link) in r.links.iter().enumerate() {
                    insert_link.execute(params![r.path, i as i64, link])?;
                }
            }
        }
        tx.commit()?;

        debug!("saved {} records to {}", records.len(), self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}

/// Run a two-column query into `first -> [second...]`, keeping row order.
fn grouped(
    conn: &Connection,
    sql: &str,
) -> Result<HashMap<String, Vec<String>>, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let mut out: HashMap<String, Vec<String>> = HashMap::new();
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (key, value) = row?;
        out.entry(key).or_default().push(value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, tags: &[&str], links: &[&str]) -> NoteRecord {
        NoteRecord {
            id: id.to_string(),
            path: format!("dir/{id}.md"),
            title: format!("Note {id}"),
            created: "2024-01-01".to_string(),
            updated: "2024-01-05".to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            links: links.iter().map(|s| s.to_string()).collect(),
            content: "Body text".to_string(),
            content_hash: format!("hash-{id}"),
        }
    }

    #[test]
    fn test_round_trip_in_memory() {
        let db = SqlitePersistence::open_in_memory().unwrap();
        let records = vec![
            record("z", &["zeta", "alpha"], &["a"]),
            record("a", &[], &["missing", "z"]),
        ];

        db.save(&records).unwrap();
        assert_eq!(db.load().unwrap(), records);
    }

    #[test]
    fn test_save_replaces_previous_rows() {
        let db = SqlitePersistence::open_in_memory().unwrap();
        db.save(&[record("a", &["x"], &[]), record("b", &[], &[])]).unwrap();
        db.save(&[record("b", &["y"], &[])]).unwrap();

        let loaded = db.load().unwrap();
        assert_eq!(loaded, vec![record("b", &["y"], &[])]);
    }

    #[test]
    fn test_reopen_file_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".notedex/index.db");
        let records = vec![record("a", &["t"], &["b"])];

        SqlitePersistence::open(&path).unwrap().save(&records).unwrap();
        let reopened = SqlitePersistence::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), records);
        assert!(reopened.describe().starts_with("sqlite:"));
    }
}
