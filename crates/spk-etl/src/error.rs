//! Error types for spk-etl

use spk_core::CoreError;
use spk_db::DbError;
use thiserror::Error;

/// Errors raised while transforming and loading one file.
///
/// Row-level variants are recorded in the file's report and the row is
/// skipped; none of them stop the run.
#[derive(Error, Debug)]
pub enum EtlError {
    /// L001: Data file could not be read
    #[error("[L001] Failed to read '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// L002: A line is not valid JSON
    #[error("[L002] Invalid JSON on line {line}: {source}")]
    InvalidJson {
        line: usize,
        source: serde_json::Error,
    },

    /// L003: A record lacks a field, or a field has the wrong type
    #[error("[L003] Invalid {table} record on line {line}: {source}")]
    InvalidRecord {
        table: &'static str,
        line: usize,
        source: serde_json::Error,
    },

    /// L004: A field is present but its value is unusable
    #[error("[L004] Invalid {field} on line {line}: {message}")]
    InvalidField {
        field: &'static str,
        line: usize,
        message: String,
    },

    /// L005: File holds no records
    #[error("[L005] File contains no records")]
    EmptyFile,

    /// L006: Insert statement failed
    #[error("[L006] Insert into {table} failed on line {line}: {source}")]
    Insert {
        table: &'static str,
        line: usize,
        source: DbError,
    },

    /// L007: Song/artist lookup failed
    #[error("[L007] Song lookup failed on line {line}: {source}")]
    Lookup { line: usize, source: DbError },

    /// L008: Data discovery failed
    #[error("[L008] {0}")]
    Discovery(#[from] CoreError),

    /// L009: Transaction handling failed
    #[error("[L009] {0}")]
    Transaction(#[from] DbError),
}

impl EtlError {
    /// Whether the error came back from a statement sent to the database.
    ///
    /// DuckDB aborts the open transaction after such an error, so every
    /// later statement of the same file fails as well.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            EtlError::Insert { .. } | EtlError::Lookup { .. } | EtlError::Transaction(_)
        )
    }
}

/// Result type alias for EtlError
pub type EtlResult<T> = Result<T, EtlError>;
