//! Durable storage for the index.

mod json;
mod schema;
mod sqlite;

pub use json::JsonFilePersistence;
pub use schema::{SCHEMA_VERSION, SchemaError};
pub use sqlite::SqlitePersistence;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note::NoteRecord;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid index JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Load and save the full record list.
///
/// `save` receives records in snapshot order and `load` must return them in
/// that same order.
pub trait Persistence: Send + Sync {
    fn load(&self) -> Result<Vec<NoteRecord>, PersistenceError>;

    fn save(&self, records: &[NoteRecord]) -> Result<(), PersistenceError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Storage backend selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Json,
    Sqlite,
}

impl Backend {
    /// Default file name under the index directory.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Backend::Json => "index.json",
            Backend::Sqlite => "index.db",
        }
    }
}

/// Open the configured backend at `path`.
pub fn open_backend(
    backend: Backend,
    path: &Path,
) -> Result<Box<dyn Persistence>, PersistenceError> {
    Ok(match backend {
        Backend::Json => Box::new(JsonFilePersistence::new(path)),
        Backend::Sqlite => Box::new(SqlitePersistence::open(path)?),
    })
}

fn ensure_parent(path: &Path) -> Result<(), PersistenceError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|source| PersistenceError::Io { path: parent.to_path_buf(), source }),
        _ => Ok(()),
    }
}
