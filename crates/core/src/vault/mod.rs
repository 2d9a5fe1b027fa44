//! Notes directory discovery, change detection, and change sources.
//!
//! This module provides utilities for walking the notes root, computing
//! content digests, and turning filesystem activity into change events.

pub mod hasher;
pub mod source;
pub mod walker;
pub mod watch;

pub use hasher::{ChangeCheck, digest_bytes, should_upsert};
pub use source::{ChangeEvent, ChangeSource, FsChangeSource, SourceFile};
pub use walker::{NotesWalker, WalkError, WalkedFile};
pub use watch::{NotesWatcher, WatchError};
