//! Configuration types and parsing for sparkify.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::{
    default_database_path, default_extension, default_log_path, default_max_errors_per_file,
    default_song_path,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names searched for in a project directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["sparkify.yml", "sparkify.yaml"];

/// Main ETL configuration from sparkify.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Input data locations
    #[serde(default)]
    pub data: DataConfig,

    /// Load behaviour
    #[serde(default)]
    pub etl: EtlConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// DuckDB file path, or `:memory:` for an in-memory database
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether this configuration points at an in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// Input data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Root of the song-catalog tree
    #[serde(default = "default_song_path")]
    pub song_path: String,

    /// Root of the event-log tree
    #[serde(default = "default_log_path")]
    pub log_path: String,

    /// Extension of data files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Also load files under hidden directories (e.g. `.ipynb_checkpoints`)
    #[serde(default)]
    pub include_hidden: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            song_path: default_song_path(),
            log_path: default_log_path(),
            extension: default_extension(),
            include_hidden: false,
        }
    }
}

/// Load behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EtlConfig {
    /// What happens when a user row already exists
    #[serde(default)]
    pub user_conflict: UserConflictPolicy,

    /// Number of error messages kept per file report
    #[serde(default = "default_max_errors_per_file")]
    pub max_errors_per_file: usize,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            user_conflict: UserConflictPolicy::default(),
            max_errors_per_file: default_max_errors_per_file(),
        }
    }
}

/// Conflict policy for the `users` dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserConflictPolicy {
    /// Keep the first-seen row; later rows for the same user are no-ops
    #[default]
    Skip,
    /// Overwrite the stored row with the latest-seen values
    Update,
}

impl std::fmt::Display for UserConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserConflictPolicy::Skip => write!(f, "skip"),
            UserConflictPolicy::Update => write!(f, "update"),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                source: e,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for sparkify.yml or sparkify.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
        {
            Some(path) => Self::load(&path),
            None => Err(CoreError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Load configuration from a project directory, falling back to defaults
    /// when no config file is present. Parse and validation errors still fail.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        match Self::load_from_dir(dir) {
            Err(CoreError::ConfigNotFound { path }) => {
                log::debug!("No config file at {}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.database.path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }
        if self.data.song_path.trim().is_empty() || self.data.log_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "data.song_path and data.log_path cannot be empty".to_string(),
            });
        }
        let ext = self.data.extension.as_str();
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\', '*']) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "data.extension must be a bare extension like 'json', found '{}'",
                    ext
                ),
            });
        }
        Ok(())
    }

    /// Absolute path of the song-catalog root
    pub fn song_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.data.song_path)
    }

    /// Absolute path of the event-log root
    pub fn log_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.data.log_path)
    }

    /// Database path resolved against `root`; `:memory:` is passed through
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.is_in_memory() {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
