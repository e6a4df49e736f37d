//! Data file discovery
//!
//! Walks a data root and returns every file with the configured extension,
//! sorted by path so repeated runs visit files in the same order.

use crate::error::{CoreError, CoreResult};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

/// Recursively find all `*.{extension}` files under `root`, sorted by path.
///
/// Hidden files and directories (leading `.`) are skipped unless
/// `include_hidden` is set. Unreadable entries are logged and skipped.
pub fn discover_files(
    root: &Path,
    extension: &str,
    include_hidden: bool,
) -> CoreResult<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(CoreError::DataPathNotFound {
            path: root.display().to_string(),
        });
    }

    let root_str = root.to_str().ok_or_else(|| CoreError::InvalidDataPath {
        path: root.display().to_string(),
        reason: "path is not valid UTF-8".to_string(),
    })?;
    let pattern = format!(
        "{}/**/*.{}",
        Pattern::escape(root_str.trim_end_matches('/')),
        Pattern::escape(extension)
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: !include_hidden,
    };

    let entries = glob::glob_with(&pattern, options).map_err(|e| CoreError::InvalidDataPath {
        path: root.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping unreadable path {}: {}", e.path().display(), e),
        }
    }

    files.sort();
    log::debug!("{} files found in {}", files.len(), root.display());
    Ok(files)
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;
