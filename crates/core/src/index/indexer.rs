//! Owns the store and keeps it persisted.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::debounce::{DebouncedSaver, SaveJob};
use super::persist::{Persistence, PersistenceError};
use super::store::{IndexStore, RebuildFailure, RebuildReport, UpsertOutcome};
use crate::note::{MalformedDocument, NoteRecord, parse_note, parse_note_with_digest};
use crate::vault::{ChangeEvent, ChangeSource, WalkError, should_upsert};

/// Default quiet period before a save.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Malformed note {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: MalformedDocument,
    },
}

#[derive(Debug, Clone)]
pub struct IndexerOptions {
    pub save_debounce: Duration,
}

impl Default for IndexerOptions {
    fn default() -> Self {
        Self { save_debounce: DEFAULT_SAVE_DEBOUNCE }
    }
}

/// What a single change event did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Content digest matched the indexed one.
    Unchanged,
    Upserted(UpsertOutcome),
    /// Whether a record existed at the path.
    Removed(bool),
}

/// Single writer for the index.
///
/// Mutations hold the write lock for their whole duration, so readers see
/// either the state before or after a change, never a mix.
pub struct Indexer {
    store: Arc<RwLock<IndexStore>>,
    job: SaveJob,
    saver: Option<DebouncedSaver>,
}

impl Indexer {
    /// Load the persisted index and start the background saver.
    ///
    /// Must be called inside a tokio runtime.
    pub fn open(
        persistence: Arc<dyn Persistence>,
        options: IndexerOptions,
    ) -> Result<Self, IndexerError> {
        let records = persistence.load()?;
        let (store, report) = IndexStore::from_records(records);
        let repaired = !report.duplicates.is_empty();
        if repaired {
            warn!(
                "Repaired {} duplicate ids while loading {}",
                report.duplicates.len(),
                persistence.describe()
            );
        }
        info!("Loaded {} notes from {}", store.len(), persistence.describe());

        let store = Arc::new(RwLock::new(store));
        let job = SaveJob::new(store.clone(), persistence);
        let saver = DebouncedSaver::spawn(job.clone(), options.save_debounce);
        if repaired {
            job.mark_pending();
            saver.schedule();
        }

        Ok(Self { store, job, saver: Some(saver) })
    }

    /// Replace the whole index with what `source` lists, then save immediately.
    ///
    /// A failed save is returned, but the rebuilt in-memory index is kept.
    pub fn rebuild(&self, source: &dyn ChangeSource) -> Result<RebuildReport, IndexerError> {
        let files = source.list_all()?;

        let attempts: Vec<Result<NoteRecord, RebuildFailure>> = files
            .into_iter()
            .map(|file| match file.raw {
                Ok(raw) => parse_note(&file.path, &raw)
                    .map_err(|e| RebuildFailure { path: file.path, message: e.to_string() }),
                Err(e) => Err(RebuildFailure {
                    path: file.path,
                    message: format!("failed to read file: {e}"),
                }),
            })
            .collect();

        let report = self.write().rebuild_all(attempts);

        if let Some(saver) = &self.saver {
            saver.cancel();
        }
        self.job.mark_pending();
        self.job.run()?;

        info!(
            "Rebuilt index: {} indexed, {} failed, {} duplicate ids in {}ms",
            report.indexed,
            report.failures.len(),
            report.duplicates.len(),
            report.duration_ms
        );
        Ok(report)
    }

    /// Index new bytes for `path`.
    ///
    /// Unchanged content short-circuits. A document that fails to parse leaves
    /// the previous record (and its digest) in place.
    pub fn on_changed(&self, path: &str, raw: &[u8]) -> Result<ChangeOutcome, IndexerError> {
        let outcome = {
            let mut store = self.write();
            let check = should_upsert(path, raw, store.digest_for(path));
            if !check.changed {
                debug!("{path} unchanged, skipping");
                return Ok(ChangeOutcome::Unchanged);
            }

            let record = parse_note_with_digest(path, raw, check.digest).map_err(|source| {
                warn!("Failed to index {path}: {source}");
                IndexerError::Malformed { path: path.to_string(), source }
            })?;
            store.upsert(record)
        };

        debug!("indexed {path} as '{}' ({:?})", outcome.id, outcome.kind);
        self.schedule_save();
        Ok(ChangeOutcome::Upserted(outcome))
    }

    /// Drop the record at `path`. Returns false if there was none.
    pub fn on_removed(&self, path: &str) -> bool {
        let removed = self.write().remove_by_path(path);
        if removed {
            debug!("removed {path} from index");
            self.schedule_save();
        }
        removed
    }

    /// Apply one event from a live change stream.
    pub fn apply(&self, event: ChangeEvent) -> Result<ChangeOutcome, IndexerError> {
        match event {
            ChangeEvent::Changed { path, raw } => self.on_changed(&path, &raw),
            ChangeEvent::Removed { path } => Ok(ChangeOutcome::Removed(self.on_removed(&path))),
        }
    }

    /// Clone of all records in snapshot order.
    pub fn snapshot(&self) -> Vec<NoteRecord> {
        self.read().snapshot()
    }

    /// Run `f` with shared access to the store.
    pub fn with_store<R>(&self, f: impl FnOnce(&IndexStore) -> R) -> R {
        f(&self.read())
    }

    /// Save the current contents now.
    pub fn flush(&self) -> Result<(), IndexerError> {
        self.job.run()?;
        Ok(())
    }

    /// Stop the background saver and write a final save.
    pub async fn shutdown(mut self) -> Result<(), IndexerError> {
        if let Some(saver) = self.saver.take() {
            saver.shutdown().await;
        }
        self.flush()?;
        debug!("indexer shut down, final save to {}", self.job.persistence().describe());
        Ok(())
    }

    /// Message of the most recent failed save, cleared by the next success.
    pub fn last_save_error(&self) -> Option<String> {
        self.job.last_error()
    }

    /// True while a mutation has not been persisted yet.
    pub fn has_pending_save(&self) -> bool {
        self.job.pending()
    }

    /// Number of successful saves since open.
    pub fn save_count(&self) -> u64 {
        self.job.save_count()
    }

    fn schedule_save(&self) {
        self.job.mark_pending();
        if let Some(saver) = &self.saver {
            saver.schedule();
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexStore> {
        self.store.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexStore> {
        self.store.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
