//! Single JSON file backend.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Persistence, PersistenceError, ensure_parent};
use crate::note::NoteRecord;

/// Pretty-printed JSON array of records.
///
/// Writes go to a sibling temp file which is then renamed over the target, so
/// a crash mid-save leaves the previous index intact.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: &Path) -> Self {
        Self { path: path.to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Serialized form written by [`JsonFilePersistence`].
fn to_json(records: &[NoteRecord]) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<NoteRecord>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no index at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(PersistenceError::Io { path: self.path.clone(), source });
            }
        };

        serde_json::from_str(&content)
            .map_err(|source| PersistenceError::Json { path: self.path.clone(), source })
    }

    fn save(&self, records: &[NoteRecord]) -> Result<(), PersistenceError> {
        ensure_parent(&self.path)?;
        let json = to_json(records)
            .map_err(|source| PersistenceError::Json { path: self.path.clone(), source })?;

        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|source| PersistenceError::Io { path: tmp.clone(), source })?;
        fs::rename(&tmp, &self.path)
            .map_err(|source| PersistenceError::Io { path: self.path.clone(), source })?;

        debug!("saved {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
