//! Error types for spk-core

use thiserror::Error;

/// Core error type for the Sparkify ETL
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config {path}: {source}")]
    ConfigParseError {
        path: String,
        source: serde_yaml::Error,
    },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: Data directory not found
    #[error("[C004] Data directory not found: {path}")]
    DataPathNotFound { path: String },

    /// C005: Data directory could not be turned into a search pattern
    #[error("[C005] Invalid data path '{path}': {reason}")]
    InvalidDataPath { path: String, reason: String },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
