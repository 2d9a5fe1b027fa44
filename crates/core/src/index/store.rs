//! In-memory note index.
//!
//! Records are keyed by path. The id is a secondary attribute kept unique by
//! suffixing collisions, and both the id and tag lookups are rebuilt on every
//! mutation so they never drift from the primary map.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::note::NoteRecord;

/// A note whose id was already taken and had to be renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub path: String,
    pub original: String,
    pub assigned: String,
}

/// A file that could not be turned into a record during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildFailure {
    pub path: String,
    pub message: String,
}

/// Summary of a full rebuild.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RebuildReport {
    /// Number of attempts seen, successful or not.
    pub files_seen: usize,
    /// Number of records in the store afterwards.
    pub indexed: usize,
    pub failures: Vec<RebuildFailure>,
    pub duplicates: Vec<DuplicateId>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertKind {
    Inserted,
    Replaced,
}

/// Result of [`IndexStore::upsert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub kind: UpsertKind,
    /// Id the record ended up with.
    pub id: String,
    pub renamed: Option<DuplicateId>,
}

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    record: NoteRecord,
}

#[derive(Debug, Default)]
pub struct IndexStore {
    by_path: HashMap<String, Entry>,
    path_by_id: HashMap<String, String>,
    ids_by_tag: HashMap<String, BTreeSet<String>>,
    next_seq: u64,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records in the given order.
    pub fn from_records(records: impl IntoIterator<Item = NoteRecord>) -> (Self, RebuildReport) {
        let mut store = Self::new();
        let report = store.rebuild_all(records.into_iter().map(Ok));
        (store, report)
    }

    /// Drop everything and repopulate from `attempts`, in order.
    ///
    /// Failed attempts are reported and skipped. Insertion order is the
    /// iteration order, so a sorted input gives a deterministic result.
    pub fn rebuild_all(
        &mut self,
        attempts: impl IntoIterator<Item = Result<NoteRecord, RebuildFailure>>,
    ) -> RebuildReport {
        let start = Instant::now();
        self.clear();

        let mut report = RebuildReport::default();
        for attempt in attempts {
            report.files_seen += 1;
            match attempt {
                Ok(record) => {
                    if let Some(dup) = self.upsert(record).renamed {
                        report.duplicates.push(dup);
                    }
                }
                Err(failure) => {
                    warn!("Failed to index {}: {}", failure.path, failure.message);
                    report.failures.push(failure);
                }
            }
        }

        report.indexed = self.by_path.len();
        report.duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            seen = report.files_seen,
            indexed = report.indexed,
            failures = report.failures.len(),
            "store rebuilt"
        );
        report
    }

    /// Insert or replace the record at `record.path`.
    pub fn upsert(&mut self, mut record: NoteRecord) -> UpsertOutcome {
        let (kind, seq) = match self.by_path.remove(&record.path) {
            Some(old) => {
                self.unindex(&old.record);
                (UpsertKind::Replaced, old.seq)
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                (UpsertKind::Inserted, seq)
            }
        };

        let mut renamed = None;
        if self.path_by_id.contains_key(&record.id) {
            let assigned = self.free_id(&record.id);
            warn!(
                "Duplicate id '{}' in {}; indexed as '{}'",
                record.id, record.path, assigned
            );
            renamed = Some(DuplicateId {
                path: record.path.clone(),
                original: std::mem::replace(&mut record.id, assigned.clone()),
                assigned,
            });
        }

        self.index(&record);
        let id = record.id.clone();
        self.by_path.insert(record.path.clone(), Entry { seq, record });

        UpsertOutcome { kind, id, renamed }
    }

    /// Remove the record at `path`. Returns false if there was none.
    pub fn remove_by_path(&mut self, path: &str) -> bool {
        match self.by_path.remove(path) {
            Some(entry) => {
                self.unindex(&entry.record);
                true
            }
            None => false,
        }
    }

    /// All records, most recently updated first. Ties keep insertion order.
    pub fn snapshot(&self) -> Vec<NoteRecord> {
        let mut entries: Vec<&Entry> = self.by_path.values().collect();
        entries.sort_by(|a, b| {
            b.record.updated.cmp(&a.record.updated).then(a.seq.cmp(&b.seq))
        });
        entries.into_iter().map(|e| e.record.clone()).collect()
    }

    pub fn get_by_path(&self, path: &str) -> Option<&NoteRecord> {
        self.by_path.get(path).map(|e| &e.record)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&NoteRecord> {
        self.path_by_id.get(id).and_then(|p| self.get_by_path(p))
    }

    /// Digest recorded for `path` at its last successful mutation.
    pub fn digest_for(&self, path: &str) -> Option<&str> {
        self.get_by_path(path).map(|r| r.content_hash.as_str())
    }

    /// Ids of records carrying `tag`, compared case-insensitively.
    pub fn ids_with_tag(&self, tag: &str) -> Vec<&str> {
        self.ids_by_tag
            .get(&tag.to_lowercase())
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Lowercased tag to number of records carrying it.
    pub fn tags(&self) -> BTreeMap<&str, usize> {
        self.ids_by_tag.iter().map(|(tag, ids)| (tag.as_str(), ids.len())).collect()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    fn clear(&mut self) {
        self.by_path.clear();
        self.path_by_id.clear();
        self.ids_by_tag.clear();
        self.next_seq = 0;
    }

    /// Smallest `{id}-{n}` with `n >= 2` that no record holds.
    fn free_id(&self, id: &str) -> String {
        (2u64..)
            .map(|n| format!("{id}-{n}"))
            .find(|candidate| !self.path_by_id.contains_key(candidate))
            .unwrap_or_else(|| format!("{id}-{}", self.next_seq))
    }

    fn index(&mut self, record: &NoteRecord) {
        self.path_by_id.insert(record.id.clone(), record.path.clone());
        for tag in &record.tags {
            self.ids_by_tag
                .entry(tag.to_lowercase())
                .or_default()
                .insert(record.id.clone());
        }
    }

    fn unindex(&mut self, record: &NoteRecord) {
        if self.path_by_id.get(&record.id) == Some(&record.path) {
            self.path_by_id.remove(&record.id);
        }
        for tag in &record.tags {
            let key = tag.to_lowercase();
            if let Some(ids) = self.ids_by_tag.get_mut(&key) {
                ids.remove(&record.id);
                if ids.is_empty() {
                    self.ids_by_tag.remove(&key);
                }
            }
        }
    }
}
