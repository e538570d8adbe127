//! CLI configuration
//!
//! Resolution order: `--config <path>` if given, else `formkit.toml` inside
//! the data directory if present, else built-in defaults. Command-line
//! flags override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};

use formkit_store::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Data directory used when neither flag nor file names one
pub const DEFAULT_DATA_DIR: &str = ".formkit";

/// Config file looked up inside the data directory
pub const CONFIG_FILE_NAME: &str = "formkit.toml";

/// Errors loading the config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

/// Whole config file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where the persisted store lives
    pub data_dir: Option<PathBuf>,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Parse a config file
    ///
    /// # Errors
    /// Unreadable file or invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "loading config");
        let text = fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find and load the effective config
    ///
    /// An explicit path must exist; the data directory file is optional.
    ///
    /// # Errors
    /// See [`CliConfig::load`].
    pub fn resolve(explicit: Option<&Path>, data_dir: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = data_dir
            .unwrap_or_else(|| Path::new(DEFAULT_DATA_DIR))
            .join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            debug!(path = %candidate.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Data directory: flag, then file, then default
    #[must_use]
    pub fn data_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    /// With log level override
    #[inline]
    #[must_use]
    pub fn with_log_level(mut self, level: Option<&str>) -> Self {
        if let Some(level) = level {
            self.logging.level = level.to_string();
        }
        self
    }

    /// With JSON log output override
    #[inline]
    #[must_use]
    pub fn with_log_json(mut self, json: bool) -> Self {
        self.logging.json |= json;
        self
    }
}
