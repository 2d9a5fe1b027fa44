pub mod doctor;
pub mod export;
pub mod graph;
pub mod list;
pub mod output;
pub mod reindex;
pub mod search;
pub mod stats;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use notedex_core::config::{ConfigLoader, ResolvedConfig};
use notedex_core::index::{IndexStore, Indexer, IndexerOptions, Persistence, open_backend};
use notedex_core::note::NoteRecord;

/// Load configuration and start logging, or exit with the error.
pub fn load_config(config: Option<&Path>, profile: Option<&str>) -> ResolvedConfig {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = crate::logging::init(&rc.logging) {
        eprintln!("Error setting up logging: {}", e);
        std::process::exit(1);
    }
    rc
}

pub fn open_persistence(rc: &ResolvedConfig) -> Arc<dyn Persistence> {
    match open_backend(rc.backend, &rc.index_path) {
        Ok(p) => Arc::from(p),
        Err(e) => {
            eprintln!("Error opening index {}: {}", rc.index_path.display(), e);
            std::process::exit(1);
        }
    }
}

/// Open the index for writing. Needs a tokio runtime.
pub fn open_indexer(rc: &ResolvedConfig) -> Indexer {
    let options = IndexerOptions { save_debounce: rc.save_debounce() };
    match Indexer::open(open_persistence(rc), options) {
        Ok(indexer) => indexer,
        Err(e) => {
            eprintln!("Error loading index: {}", e);
            std::process::exit(1);
        }
    }
}

/// Persisted index as a read-only store, for query commands.
pub fn load_store(rc: &ResolvedConfig) -> IndexStore {
    let records = match open_persistence(rc).load() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error loading index: {}", e);
            eprintln!("Hint: Run 'ndx reindex' to rebuild the index.");
            std::process::exit(1);
        }
    };
    if records.is_empty() {
        tracing::warn!("Index at {} is empty; run 'ndx reindex' first", rc.index_path.display());
    }
    IndexStore::from_records(records).0
}

/// Persisted records in snapshot order.
pub fn load_records(rc: &ResolvedConfig) -> Vec<NoteRecord> {
    load_store(rc).snapshot()
}
