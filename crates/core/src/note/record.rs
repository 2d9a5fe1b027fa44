//! Note record type.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

/// One indexed note.
///
/// Records are replaced wholesale on every change; nothing patches individual
/// fields after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Note identifier from frontmatter, or the file stem.
    pub id: String,
    /// Slash-separated path relative to the notes root.
    pub path: String,
    pub title: String,
    /// Creation date, `YYYY-MM-DD`.
    pub created: String,
    /// Last update date, `YYYY-MM-DD`.
    pub updated: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Target note ids. May name notes that are not indexed.
    #[serde(default)]
    pub links: Vec<String>,
    /// Body without frontmatter, trimmed.
    #[serde(default)]
    pub content: String,
    /// SHA-256 of the raw file bytes.
    pub content_hash: String,
}

impl NoteRecord {
    /// Case-insensitive exact tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.to_lowercase() == tag.to_lowercase())
    }

    /// Whitespace-separated words in the body.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn normalize_rel_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
