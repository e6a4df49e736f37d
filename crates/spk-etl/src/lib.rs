//! spk-etl - Transform and load pipeline for the Sparkify ETL
//!
//! Song-catalog files become `songs` and `artists` rows; event-log files
//! become `time`, `users`, and `songplays` rows with song and artist keys
//! resolved against the catalog already loaded.

pub mod error;
pub mod log_file;
pub mod pipeline;
pub(crate) mod records;
pub mod report;
pub mod song_file;
pub mod time_dim;

pub use error::{EtlError, EtlResult};
pub use log_file::process_log_file;
pub use pipeline::{DataKind, Pipeline, Progress};
pub use report::{FileReport, RunReport};
pub use song_file::process_song_file;
pub use time_dim::TimeRow;
