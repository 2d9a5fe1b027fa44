//! Where note bytes come from.

use std::io;
use std::path::{Path, PathBuf};

use super::walker::{NotesWalker, WalkError};

/// One file reported by a full listing.
#[derive(Debug)]
pub struct SourceFile {
    /// Slash-separated path relative to the notes root.
    pub path: String,
    /// Raw bytes, or the error hit while reading them.
    pub raw: io::Result<Vec<u8>>,
}

/// A single incremental change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Changed { path: String, raw: Vec<u8> },
    Removed { path: String },
}

impl ChangeEvent {
    pub fn path(&self) -> &str {
        match self {
            ChangeEvent::Changed { path, .. } | ChangeEvent::Removed { path } => path,
        }
    }
}

/// Something that can enumerate every note for a full rebuild.
pub trait ChangeSource {
    fn list_all(&self) -> Result<Vec<SourceFile>, WalkError>;
}

/// [`ChangeSource`] over a directory on disk.
#[derive(Debug, Clone)]
pub struct FsChangeSource {
    walker: NotesWalker,
}

impl FsChangeSource {
    pub fn new(root: &Path, excluded_folders: Vec<PathBuf>) -> Result<Self, WalkError> {
        Ok(Self { walker: NotesWalker::with_exclusions(root, excluded_folders)? })
    }
}

impl ChangeSource for FsChangeSource {
    fn list_all(&self) -> Result<Vec<SourceFile>, WalkError> {
        let files = self.walker.walk()?;
        Ok(files
            .into_iter()
            .map(|f| SourceFile {
                raw: std::fs::read(&f.absolute_path),
                path: f.relative_path,
            })
            .collect())
    }
}

/// Fixed in-memory listing, handy for tests and imports.
impl ChangeSource for Vec<(String, Vec<u8>)> {
    fn list_all(&self) -> Result<Vec<SourceFile>, WalkError> {
        Ok(self
            .iter()
            .map(|(path, raw)| SourceFile { path: path.clone(), raw: Ok(raw.clone()) })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fs_source_lists_markdown_with_bytes() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("daily")).unwrap();
        fs::write(dir.path().join("daily/a.md"), "alpha").unwrap();
        fs::write(dir.path().join("b.md"), "beta").unwrap();
        fs::write(dir.path().join("c.txt"), "ignored").unwrap();

        let source = FsChangeSource::new(dir.path(), Vec::new()).unwrap();
        let files = source.list_all().unwrap();

        let listed: Vec<(&str, &[u8])> = files
            .iter()
            .map(|f| (f.path.as_str(), f.raw.as_ref().unwrap().as_slice()))
            .collect();
        assert_eq!(listed, vec![("b.md", &b"beta"[..]), ("daily/a.md", &b"alpha"[..])]);
    }

    #[test]
    fn test_event_path() {
        let event = ChangeEvent::Removed { path: "x.md".into() };
        assert_eq!(event.path(), "x.md");
    }
}
