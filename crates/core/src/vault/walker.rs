//! Recursive notes directory walker.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::note::normalize_rel_path;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("notes root does not exist: {0}")]
    MissingRoot(String),

    #[error("failed to walk notes directory {0}: {1}")]
    WalkFailed(String, #[source] walkdir::Error),
}

/// Information about a discovered note file.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Absolute path to the file.
    pub absolute_path: PathBuf,
    /// Slash-separated path relative to the notes root.
    pub relative_path: String,
}

/// Walker for discovering note files under a root.
#[derive(Debug, Clone)]
pub struct NotesWalker {
    root: PathBuf,
    /// Folders to skip, relative to the root.
    excluded_folders: Vec<PathBuf>,
}

impl NotesWalker {
    pub fn new(root: &Path) -> Result<Self, WalkError> {
        Self::with_exclusions(root, Vec::new())
    }

    /// Create a walker that skips the given folders.
    ///
    /// Exclusions may be relative to the root or absolute paths inside it.
    pub fn with_exclusions(
        root: &Path,
        excluded_folders: Vec<PathBuf>,
    ) -> Result<Self, WalkError> {
        let root = root
            .canonicalize()
            .map_err(|_| WalkError::MissingRoot(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(WalkError::MissingRoot(root.display().to_string()));
        }

        let excluded_folders = excluded_folders
            .into_iter()
            .map(|p| {
                if p.is_absolute() {
                    p.strip_prefix(&root).unwrap_or(&p).to_path_buf()
                } else {
                    p
                }
            })
            .collect();

        Ok(Self { root, excluded_folders })
    }

    /// Walk the root and return all note files, sorted by relative path.
    pub fn walk(&self) -> Result<Vec<WalkedFile>, WalkError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_path(e.path()))
        {
            let entry = entry
                .map_err(|e| WalkError::WalkFailed(self.root.display().to_string(), e))?;

            let path = entry.path();
            if !entry.file_type().is_file() || !is_note_file(path) {
                continue;
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);

            files.push(WalkedFile {
                absolute_path: path.to_path_buf(),
                relative_path: normalize_rel_path(relative),
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// Relative path of `path` if it is a note file this walker would visit.
    pub fn relative_note_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        if !is_note_file(path) || self.is_excluded_path(path) {
            return None;
        }
        Some(normalize_rel_path(relative))
    }

    /// True for hidden entries, tool directories, and configured exclusions.
    fn is_excluded_path(&self, path: &Path) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return true;
        };

        let skipped_component = relative.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            name.starts_with('.')
                || matches!(name.as_ref(), "node_modules" | "target" | "__pycache__" | "venv")
        });
        if skipped_component {
            return true;
        }

        self.excluded_folders.iter().any(|excluded| relative.starts_with(excluded))
    }

    /// Get the (canonical) notes root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_note_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e == "md")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_notes() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("note1.md"), "# Note 1").unwrap();
        fs::write(root.join("note2.md"), "# Note 2").unwrap();

        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/note3.md"), "# Note 3").unwrap();

        // Hidden directory holds the index itself and must be skipped
        fs::create_dir(root.join(".notedex")).unwrap();
        fs::write(root.join(".notedex/secret.md"), "# Secret").unwrap();

        fs::write(root.join("readme.txt"), "Not a note").unwrap();

        dir
    }

    fn relative_paths(files: &[WalkedFile]) -> Vec<&str> {
        files.iter().map(|f| f.relative_path.as_str()).collect()
    }

    #[test]
    fn test_walk_finds_note_files_sorted() {
        let notes = create_test_notes();
        let walker = NotesWalker::new(notes.path()).unwrap();
        let files = walker.walk().unwrap();

        assert_eq!(relative_paths(&files), vec!["note1.md", "note2.md", "subdir/note3.md"]);
    }

    #[test]
    fn test_missing_root() {
        let result = NotesWalker::new(Path::new("/nonexistent/path"));
        assert!(matches!(result.unwrap_err(), WalkError::MissingRoot(_)));
    }

    #[test]
    fn test_walk_with_nested_exclusion() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("docs/internal")).unwrap();
        fs::write(root.join("docs/readme.md"), "# Docs").unwrap();
        fs::write(root.join("docs/internal/secret.md"), "# Secret").unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("templates/t.md"), "# Template").unwrap();
        fs::write(root.join("note.md"), "# Note").unwrap();

        let excluded = vec![PathBuf::from("docs/internal"), PathBuf::from("templates")];
        let walker = NotesWalker::with_exclusions(root, excluded).unwrap();
        let files = walker.walk().unwrap();

        assert_eq!(relative_paths(&files), vec!["docs/readme.md", "note.md"]);
    }

    #[test]
    fn test_relative_note_path_filters_like_walk() {
        let notes = create_test_notes();
        let walker = NotesWalker::new(notes.path()).unwrap();
        let root = walker.root().to_path_buf();

        assert_eq!(
            walker.relative_note_path(&root.join("subdir/note3.md")).as_deref(),
            Some("subdir/note3.md")
        );
        assert_eq!(walker.relative_note_path(&root.join(".notedex/secret.md")), None);
        assert_eq!(walker.relative_note_path(&root.join("readme.txt")), None);
        assert_eq!(walker.relative_note_path(Path::new("/elsewhere/x.md")), None);
    }
}
