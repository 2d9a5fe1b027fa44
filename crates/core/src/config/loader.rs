use crate::config::types::{ConfigFile, IndexSettings, LoggingConfig, Profile, ResolvedConfig};
use shellexpand::full;
use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("no profiles defined in config")]
    NoProfiles,

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("home directory not available to expand '~'")]
    NoHome,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(
        config_path: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => default_config_path(),
        };

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        Self::from_toml(&s, &path.display().to_string(), profile_override)
    }

    /// Parse and resolve config text. `origin` names the source in errors.
    pub fn from_toml(
        s: &str,
        origin: &str,
        profile_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let cf: ConfigFile =
            toml::from_str(s).map_err(|e| ConfigError::ParseError(origin.to_string(), e))?;

        if cf.version != 1 {
            return Err(ConfigError::BadVersion(cf.version));
        }
        if cf.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }

        let active = profile_override
            .map(ToOwned::to_owned)
            .or(cf.profile.clone())
            .unwrap_or_else(|| "default".to_string());

        let prof = cf
            .profiles
            .get(&active)
            .ok_or_else(|| ConfigError::ProfileNotFound(active.clone()))?;

        Self::resolve_profile(&active, prof, &cf.index, &cf.logging)
    }

    fn resolve_profile(
        active: &str,
        prof: &Profile,
        index: &IndexSettings,
        log_cfg: &LoggingConfig,
    ) -> Result<ResolvedConfig, ConfigError> {
        let notes_root = expand_path(&prof.notes_root)?;
        let sub = |s: &str| s.replace("{{notes_root}}", &notes_root.to_string_lossy());

        let index_path = match &prof.index_path {
            Some(p) => expand_path(&sub(p))?,
            None => notes_root.join(".notedex").join(prof.backend.default_file_name()),
        };

        let logging = if let Some(ref file) = log_cfg.file {
            let expanded_file = expand_path(&sub(&file.to_string_lossy()))?;
            LoggingConfig {
                level: log_cfg.level.clone(),
                file_level: log_cfg.file_level.clone(),
                file: Some(expanded_file),
            }
        } else {
            log_cfg.clone()
        };

        Ok(ResolvedConfig {
            active_profile: active.to_string(),
            notes_root,
            index_path,
            backend: prof.backend,
            excluded_folders: prof.excluded_folders.iter().map(PathBuf::from).collect(),
            index: index.clone(),
            logging,
        })
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("notedex").join("config.toml");
    }
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("notedex").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded = full(input).map_err(|_| ConfigError::NoHome)?;
    Ok(PathBuf::from(expanded.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Backend;

    #[test]
    fn test_defaults_applied() {
        let cfg = ConfigLoader::from_toml(
            r#"
            version = 1
            [profiles.default]
            notes_root = "/srv/notes"
            "#,
            "inline",
            None,
        )
        .unwrap();

        assert_eq!(cfg.active_profile, "default");
        assert_eq!(cfg.backend, Backend::Json);
        assert_eq!(cfg.index_path, PathBuf::from("/srv/notes/.notedex/index.json"));
        assert_eq!(cfg.index.save_debounce_ms, 300);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_profile_override_and_substitution() {
        let text = r#"
            version = 1
            profile = "work"
            [profiles.work]
            notes_root = "/a"
            [profiles.home]
            notes_root = "/b"
            backend = "sqlite"
            index_path = "{{notes_root}}/cache/idx.db"
            excluded_folders = ["archive"]
            [index]
            save_debounce_ms = 50
        "#;

        let work = ConfigLoader::from_toml(text, "inline", None).unwrap();
        assert_eq!(work.notes_root, PathBuf::from("/a"));

        let home = ConfigLoader::from_toml(text, "inline", Some("home")).unwrap();
        assert_eq!(home.backend, Backend::Sqlite);
        assert_eq!(home.index_path, PathBuf::from("/b/cache/idx.db"));
        assert_eq!(home.excluded_folders, vec![PathBuf::from("archive")]);
        assert_eq!(home.save_debounce().as_millis(), 50);
    }
}
