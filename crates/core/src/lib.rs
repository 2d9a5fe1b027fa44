//! Incremental note index with boolean search.
//!
//! Notes are Markdown files with a YAML frontmatter header. The [`index`]
//! module keeps an in-memory index in sync with a notes directory and
//! persists it; [`search`] answers queries over a snapshot of it.

pub mod config;
pub mod export;
pub mod frontmatter;
pub mod graph;
pub mod index;
pub mod note;
pub mod search;
pub mod stats;
pub mod vault;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
