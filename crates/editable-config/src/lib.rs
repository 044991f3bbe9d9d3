use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Undo history tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Minimum delay between two recorded snapshots, in milliseconds
    pub debounce_ms: u64,
    /// Maximum number of snapshots kept
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 2000,
            limit: 128,
        }
    }
}

impl HistoryConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory relative document paths are resolved against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_path: Option<PathBuf>,
    pub history: HistoryConfig,
}

impl Config {
    /// Reads the file at `path`; a missing file is `Ok(None)`
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;

        // Expand shell variables and tilde in the documents directory
        config.documents_path = config
            .documents_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `~/.config/editable/config.toml`
    pub fn config_path() -> PathBuf {
        let home_config = shellexpand::tilde("~/.config/editable");
        Path::new(home_config.as_ref()).join("config.toml")
    }

    /// Resolves a document path against `documents_path` when it is relative
    pub fn resolve_document(&self, path: &Path) -> PathBuf {
        match &self.documents_path {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        shellexpand::full(&path.to_string_lossy())
            .ok()
            .map(|expanded| PathBuf::from(expanded.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path_is_expanded() {
        let path = Config::config_path();
        assert!(!path.starts_with("~"));
        assert!(path.ends_with(".config/editable/config.toml"));
    }

    #[test]
    fn test_defaults_match_history_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.history.debounce(), Duration::from_millis(2000));
        assert_eq!(config.history.limit, 128);
        assert_eq!(config.documents_path, None);
    }

    #[test]
    fn test_partial_history_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[history]\nlimit = 16\n").unwrap();
        assert_eq!(config.history.limit, 16);
        assert_eq!(config.history.debounce_ms, 2000);
    }

    #[test]
    fn test_tilde_is_expanded() {
        let expanded = Config::expand_path(Path::new("~/notes/docs")).unwrap();
        assert!(!expanded.starts_with("~"));
        assert!(expanded.ends_with("notes/docs"));
    }

    #[test]
    fn test_env_var_is_expanded() {
        unsafe {
            env::set_var("EDITABLE_TEST_VAR", "/srv/editable");
        }
        let expanded = Config::expand_path(Path::new("$EDITABLE_TEST_VAR/docs")).unwrap();
        assert_eq!(expanded, PathBuf::from("/srv/editable/docs"));
        unsafe {
            env::remove_var("EDITABLE_TEST_VAR");
        }
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = Config::load_from_path(dir.path().join("absent.toml")).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(&file, "[history]\nlimit = \"many\"\n").unwrap();

        let err = Config::load_from_path(&file).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("nested/config.toml");
        let config = Config {
            history: HistoryConfig {
                debounce_ms: 500,
                limit: 32,
            },
            documents_path: Some(PathBuf::from("/tmp/editable-docs")),
        };

        config.save_to_path(&file).unwrap();
        assert_eq!(Config::load_from_path(&file).unwrap(), Some(config));
    }

    #[test]
    fn test_documents_path_is_expanded_on_load() {
        unsafe {
            env::set_var("EDITABLE_DOCS_ROOT", "/custom/docs");
        }
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("config.toml");
        std::fs::write(&file, "documents_path = \"$EDITABLE_DOCS_ROOT/mine\"\n").unwrap();

        let config = Config::load_from_path(&file).unwrap().unwrap();
        assert_eq!(config.documents_path, Some(PathBuf::from("/custom/docs/mine")));
        assert_eq!(
            config.resolve_document(Path::new("a.json")),
            PathBuf::from("/custom/docs/mine/a.json")
        );
        assert_eq!(
            config.resolve_document(Path::new("/abs/b.json")),
            PathBuf::from("/abs/b.json")
        );

        unsafe {
            env::remove_var("EDITABLE_DOCS_ROOT");
        }
    }
}
