//! Per-file and per-run load summaries.

use crate::error::EtlError;
use spk_db::DbResult;
use std::path::{Path, PathBuf};

/// Outcome of loading one data file.
#[derive(Debug, Clone)]
pub struct FileReport {
    /// File that was loaded
    pub path: PathBuf,
    /// Statements that wrote a row
    pub inserted: usize,
    /// Statements that hit an existing key and changed nothing
    pub skipped: usize,
    /// Rows that failed to transform or insert
    pub failed: usize,
    /// Events dropped because they are not song plays
    pub filtered: usize,
    /// Songplays written without a matching song in the catalog
    pub unmatched: usize,
    /// Whether the file's transaction was committed
    pub committed: bool,
    /// First error messages, capped at `max_errors`
    pub errors: Vec<String>,
    max_errors: usize,
    aborted: bool,
}

impl FileReport {
    pub fn new(path: &Path, max_errors: usize) -> Self {
        Self {
            path: path.to_path_buf(),
            inserted: 0,
            skipped: 0,
            failed: 0,
            filtered: 0,
            unmatched: 0,
            committed: false,
            errors: Vec::new(),
            max_errors,
            aborted: false,
        }
    }

    /// Record a successful statement by its affected row count.
    pub fn record_write(&mut self, affected: usize) {
        if affected > 0 {
            self.inserted += 1;
        } else {
            self.skipped += 1;
        }
    }

    /// Record a failed row (or a file-level failure).
    pub fn record_error(&mut self, err: &EtlError) {
        self.failed += 1;
        self.aborted |= err.is_database_error();
        log::warn!("{}: {}", self.path.display(), err);
        if self.errors.len() < self.max_errors {
            self.errors.push(err.to_string());
        }
    }

    /// Record the outcome of one insert statement.
    pub(crate) fn record_insert(&mut self, table: &'static str, line: usize, result: DbResult<usize>) {
        match result {
            Ok(affected) => self.record_write(affected),
            Err(source) => self.record_error(&EtlError::Insert {
                table,
                line,
                source,
            }),
        }
    }

    /// Whether a statement failed inside the database, leaving the file's
    /// transaction unusable.
    pub fn transaction_aborted(&self) -> bool {
        self.aborted
    }

    /// Forget the writes of a rolled-back file.
    pub fn discard_writes(&mut self) {
        self.inserted = 0;
        self.skipped = 0;
        self.unmatched = 0;
        self.committed = false;
    }

    /// Whether the file committed without any failed rows.
    pub fn is_clean(&self) -> bool {
        self.committed && self.failed == 0
    }
}

/// Outcome of loading every file under one data root.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files: Vec<FileReport>,
}

impl RunReport {
    pub fn files_processed(&self) -> usize {
        self.files.len()
    }

    /// Files that failed to commit or had failed rows.
    pub fn files_with_errors(&self) -> usize {
        self.files.iter().filter(|f| !f.is_clean()).count()
    }

    pub fn rows_inserted(&self) -> usize {
        self.files.iter().map(|f| f.inserted).sum()
    }

    pub fn rows_skipped(&self) -> usize {
        self.files.iter().map(|f| f.skipped).sum()
    }

    pub fn rows_failed(&self) -> usize {
        self.files.iter().map(|f| f.failed).sum()
    }

    pub fn events_filtered(&self) -> usize {
        self.files.iter().map(|f| f.filtered).sum()
    }

    pub fn songplays_unmatched(&self) -> usize {
        self.files.iter().map(|f| f.unmatched).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.files.iter().all(FileReport::is_clean)
    }

    /// Fold another run (e.g. the log pass after the song pass) into this one.
    pub fn merge(&mut self, other: RunReport) {
        self.files.extend(other.files);
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
