//! spk-core - Core library for the Sparkify ETL
//!
//! This crate provides configuration parsing, data file discovery, and the
//! songplay fingerprint shared by the database, pipeline, and CLI crates.

pub mod checksum;
pub mod config;
pub mod discovery;
pub mod error;
pub(crate) mod serde_helpers;

pub use checksum::{compute_checksum, songplay_fingerprint};
pub use config::{Config, DataConfig, DatabaseConfig, EtlConfig, UserConflictPolicy};
pub use discovery::discover_files;
pub use error::{CoreError, CoreResult};
