//! Serde default functions for configuration fields.

pub(crate) fn default_database_path() -> String {
    "sparkify.duckdb".to_string()
}

pub(crate) fn default_song_path() -> String {
    "data/song_data".to_string()
}

pub(crate) fn default_log_path() -> String {
    "data/log_data".to_string()
}

pub(crate) fn default_extension() -> String {
    "json".to_string()
}

pub(crate) fn default_max_errors_per_file() -> usize {
    5
}
