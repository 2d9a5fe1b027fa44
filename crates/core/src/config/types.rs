use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::index::Backend;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub notes_root: String,
    /// Index file location; may use `{{notes_root}}`. Defaults to
    /// `{{notes_root}}/.notedex/index.json` (or `index.db` for SQLite).
    pub index_path: Option<String>,
    #[serde(default)]
    pub backend: Backend,
    /// Folders to skip when indexing, relative to notes_root.
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IndexSettings {
    /// Quiet period before a debounced save.
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { save_debounce_ms: default_save_debounce_ms() }
    }
}

fn default_save_debounce_ms() -> u64 {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub notes_root: PathBuf,
    pub index_path: PathBuf,
    pub backend: Backend,
    /// Folders to skip, relative to notes_root.
    pub excluded_folders: Vec<PathBuf>,
    pub index: IndexSettings,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.index.save_debounce_ms)
    }
}
