//! CLI configuration loaded from `qf.toml`.

use std::path::{Path, PathBuf};

use qf_core::{FormatterOptions, QueryFormatter, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "qf.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Escaper selected by the `escaper` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscaperKind {
    #[default]
    Sql,
    None,
}

/// `[formatter]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    pub max_depth: i32,
    pub escaper: EscaperKind,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            escaper: EscaperKind::Sql,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QfConfig {
    pub formatter: FormatterConfig,
}

impl QfConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `qf.toml` in `dir` is read
    /// when present and defaults are used otherwise.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => {
                let path = dir.join(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: i32) -> Self {
        self.formatter.max_depth = max_depth;
        self
    }

    pub fn with_escaper(mut self, escaper: EscaperKind) -> Self {
        self.formatter.escaper = escaper;
        self
    }

    /// Build the formatter this configuration describes.
    pub fn formatter(&self) -> QueryFormatter {
        let options = FormatterOptions::default().with_max_depth(self.formatter.max_depth);
        let formatter = match self.formatter.escaper {
            EscaperKind::Sql => QueryFormatter::sql(),
            EscaperKind::None => QueryFormatter::new(),
        };
        formatter.with_options(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = QfConfig::load(None, dir.path()).unwrap();

        assert_eq!(config, QfConfig::default());
        assert_eq!(config.formatter.max_depth, 10);
        assert!(config.formatter().escaper().is_some());
    }

    #[test]
    fn test_reads_default_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[formatter]\nmax_depth = 3\nescaper = \"none\"\n",
        )
        .unwrap();

        let config = QfConfig::load(None, dir.path()).unwrap();
        assert_eq!(config.formatter.max_depth, 3);
        assert_eq!(config.formatter.escaper, EscaperKind::None);

        let formatter = config.formatter();
        assert!(formatter.escaper().is_none());
        assert_eq!(formatter.options().max_depth, 3);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[formatter]\nmax_depth = 4\n").unwrap();

        let config = QfConfig::load(Some(&path), dir.path()).unwrap();
        assert_eq!(config.formatter.max_depth, 4);
        assert_eq!(config.formatter.escaper, EscaperKind::Sql);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let err = QfConfig::load(Some(&dir.path().join("nope.toml")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[formatter]\nescaper = \"xml\"\n").unwrap();

        let err = QfConfig::load(None, dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let config = QfConfig::default()
            .with_max_depth(1)
            .with_escaper(EscaperKind::None);
        assert_eq!(config.formatter.max_depth, 1);
        assert_eq!(config.formatter.escaper, EscaperKind::None);
    }
}
