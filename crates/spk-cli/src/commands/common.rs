//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use spk_core::Config;
use spk_db::Warehouse;
use std::fmt;
use std::path::PathBuf;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that the warehouse connection is closed properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) u8);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command already printed its own summary.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// `create-tables` had a failing schema statement
pub(crate) const EXIT_SCHEMA_FAILED: u8 = 2;
/// `etl --fail-on-error` saw a failed file or row
pub(crate) const EXIT_LOAD_ERRORS: u8 = 3;
/// `check` found a missing or misshapen table
pub(crate) const EXIT_CHECK_FAILED: u8 = 4;

/// Resolved project: its root directory and effective configuration.
#[derive(Debug)]
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    /// Load the configuration and apply global overrides.
    ///
    /// `--config` must point at an existing file. Without it the project
    /// directory is searched and defaults are used if no file is found.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let root = global.project_dir.clone();
        let mut config = match &global.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::load_or_default(&root).context("Failed to load project config")?,
        };
        if let Some(database) = &global.database {
            config.database.path = database.clone();
        }
        log::debug!("Using config {:?}", config);
        Ok(Self { root, config })
    }

    /// Database path with relative paths resolved against the project root.
    pub fn database_path(&self) -> String {
        self.config.database_path_absolute(&self.root)
    }

    /// Open the configured warehouse.
    pub fn open_warehouse(&self) -> Result<Warehouse> {
        let path = self.database_path();
        let mut db_config = self.config.database.clone();
        db_config.path = path.clone();
        Warehouse::open(&db_config)
            .with_context(|| format!("Failed to connect to database {}", path))
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
