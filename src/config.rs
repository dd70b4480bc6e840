//! Optional user configuration, read from `config.toml` in the platform
//! config directory. A missing file means defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_HISTORY_DISPLAY_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Where the persistent store lives. Defaults to `<data dir>/smartcalc`.
    pub data_dir: Option<PathBuf>,
    /// How many history entries `:history` lists.
    pub history_display_limit: usize,
    /// Show results with thousand separators.
    pub group_digits: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            history_display_limit: DEFAULT_HISTORY_DISPLAY_LIMIT,
            group_digits: false,
        }
    }
}

impl Config {
    /// Load the config file, if there is one.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load the config file, falling back to defaults with a warning when it
    /// cannot be read or parsed.
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config.unwrap_or_default(),
            Err(err) => {
                tracing::warn!("{}", err);
                Self::default()
            }
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("smartcalc").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_display_limit, 10);
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            data_dir = "/tmp/calc"
            history_display_limit = 25
            group_digits = true
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/calc")));
        assert_eq!(config.history_display_limit, 25);
        assert!(config.group_digits);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "group_digits = \"yes\"").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
