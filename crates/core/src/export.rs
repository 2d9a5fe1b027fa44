//! Tag-filtered dumps of the index.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::index::IndexStore;
use crate::note::NoteRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("at least one tag is required for export")]
    NoTags,

    #[error("Failed to write export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize export: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where an export went and how many notes it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub count: usize,
}

fn clean_tags(tags: &[String]) -> Vec<&str> {
    tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect()
}

/// Records carrying every tag, in snapshot order.
pub fn select_by_tags(store: &IndexStore, tags: &[String]) -> Result<Vec<NoteRecord>, ExportError> {
    let tags = clean_tags(tags);
    let Some((first, rest)) = tags.split_first() else {
        return Err(ExportError::NoTags);
    };

    let mut ids: HashSet<&str> = store.ids_with_tag(first).into_iter().collect();
    for tag in rest {
        let other: HashSet<&str> = store.ids_with_tag(tag).into_iter().collect();
        ids.retain(|id| other.contains(id));
    }

    Ok(store.snapshot().into_iter().filter(|r| ids.contains(r.id.as_str())).collect())
}

/// File name for an export of `tags`, e.g. `notes-work_rust.json`.
pub fn export_file_name(tags: &[String]) -> String {
    let joined = clean_tags(tags).join("_").replace(['/', '\\'], "-");
    format!("notes-{joined}.json")
}

/// Write the matching records as a pretty JSON array under `dir`.
pub fn export_by_tags(
    store: &IndexStore,
    tags: &[String],
    dir: &Path,
) -> Result<ExportSummary, ExportError> {
    let records = select_by_tags(store, tags)?;

    fs::create_dir_all(dir).map_err(|source| ExportError::Io { path: dir.to_path_buf(), source })?;
    let path = dir.join(export_file_name(tags));
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(&path, json).map_err(|source| ExportError::Io { path: path.clone(), source })?;

    info!("Exported {} notes to {}", records.len(), path.display());
    Ok(ExportSummary { path, count: records.len() })
}
