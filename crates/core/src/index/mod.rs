//! Note index: in-memory store, persistence and the coordinator that ties
//! them together.

mod debounce;
pub mod indexer;
pub mod persist;
pub mod store;

pub use indexer::{ChangeOutcome, DEFAULT_SAVE_DEBOUNCE, Indexer, IndexerError, IndexerOptions};
pub use persist::{
    Backend, JsonFilePersistence, Persistence, PersistenceError, SqlitePersistence, open_backend,
};
pub use store::{
    DuplicateId, IndexStore, RebuildFailure, RebuildReport, UpsertKind, UpsertOutcome,
};
