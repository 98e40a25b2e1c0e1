use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// History settings read from the editor configuration
///
/// ```toml
/// max_history_size = 50
/// max_command_history = 100
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of journal snapshots, 0 disables the journal
    pub max_history_size: usize,
    /// Maximum number of recorded transactions, 0 disables recording
    pub max_command_history: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_size: 50,
            max_command_history: 100,
        }
    }
}

impl HistoryConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load settings, falling back to defaults if the file is missing or invalid
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_file(path).unwrap_or_else(|err| {
                warn!(error = %err, "using default history settings");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn journal_enabled(&self) -> bool {
        self.max_history_size > 0
    }
}
