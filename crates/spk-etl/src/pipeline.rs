//! Pipeline driver.
//!
//! Discovers the data files under a root, loads each one in its own
//! transaction, and collects a [`FileReport`] per file. A failing file never
//! stops the run.

use crate::error::{EtlError, EtlResult};
use crate::log_file::process_log_file;
use crate::report::{FileReport, RunReport};
use crate::song_file::process_song_file;
use spk_core::{discover_files, Config, DataConfig, EtlConfig};
use spk_db::{DbError, Warehouse};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which transformer a data root is fed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Single-record song-catalog files
    Songs,
    /// Newline-delimited event logs
    Logs,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Songs => write!(f, "songs"),
            DataKind::Logs => write!(f, "logs"),
        }
    }
}

/// Progress notification sent after each file.
#[derive(Debug)]
pub struct Progress<'a> {
    pub kind: DataKind,
    /// 1-based position of the file just processed
    pub index: usize,
    pub total: usize,
    pub report: &'a FileReport,
}

/// Drives files through the transformers against one warehouse.
pub struct Pipeline<'a> {
    warehouse: &'a Warehouse,
    data: DataConfig,
    etl: EtlConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(warehouse: &'a Warehouse, config: &Config) -> Self {
        Self {
            warehouse,
            data: config.data.clone(),
            etl: config.etl.clone(),
        }
    }

    /// Data files under `root`, sorted by path.
    pub fn discover(&self, root: &Path) -> EtlResult<Vec<PathBuf>> {
        let files = discover_files(root, &self.data.extension, self.data.include_hidden)?;
        log::info!("{} files found in {}", files.len(), root.display());
        Ok(files)
    }

    /// Discover and load every file under `root`.
    ///
    /// Only discovery failures are returned as errors; per-file failures are
    /// in the returned report.
    pub fn run<F>(&self, kind: DataKind, root: &Path, on_progress: F) -> EtlResult<RunReport>
    where
        F: FnMut(&Progress<'_>),
    {
        let files = self.discover(root)?;
        Ok(self.process_files(kind, &files, on_progress))
    }

    /// Load `files` in order, one transaction per file.
    pub fn process_files<F>(&self, kind: DataKind, files: &[PathBuf], mut on_progress: F) -> RunReport
    where
        F: FnMut(&Progress<'_>),
    {
        let total = files.len();
        let mut run = RunReport::default();
        for (i, path) in files.iter().enumerate() {
            let report = self.process_file(kind, path);
            log::info!("{}/{} files processed.", i + 1, total);
            on_progress(&Progress {
                kind,
                index: i + 1,
                total,
                report: &report,
            });
            run.files.push(report);
        }
        run
    }

    /// Load one file inside its own transaction.
    ///
    /// Rows that loaded are committed even when other rows of the same file
    /// failed validation. A statement that fails inside the database aborts
    /// the transaction, so the whole file is rolled back and reported as not
    /// committed.
    pub fn process_file(&self, kind: DataKind, path: &Path) -> FileReport {
        let mut report = FileReport::new(path, self.etl.max_errors_per_file);

        let outcome = self.warehouse.transaction(|warehouse| {
            let result = match kind {
                DataKind::Songs => process_song_file(warehouse, path, &mut report),
                DataKind::Logs => {
                    process_log_file(warehouse, path, self.etl.user_conflict, &mut report)
                }
            };
            if let Err(e) = result {
                report.record_error(&e);
            }
            if report.transaction_aborted() {
                return Err(DbError::TransactionError(
                    "rolled back after a failed statement".to_string(),
                ));
            }
            Ok(())
        });

        match outcome {
            Ok(()) => report.committed = true,
            Err(e) => {
                report.discard_writes();
                report.record_error(&EtlError::from(e));
            }
        }
        report
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
