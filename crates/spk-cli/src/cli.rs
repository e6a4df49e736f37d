//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use spk_etl::DataKind;
use std::path::PathBuf;

/// Sparkify ETL - load song catalog and event logs into a star schema
#[derive(Parser, Debug)]
#[command(name = "spk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings, errors, and the final summary
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override database path (DuckDB file or :memory:)
    #[arg(short, long, global = true, env = "SPARKIFY_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop and recreate the warehouse tables
    CreateTables,

    /// Load song files, then event logs
    Etl(EtlArgs),

    /// Verify table shapes and print row counts
    Check,
}

/// Arguments for the etl command
#[derive(Args, Debug, Default)]
pub struct EtlArgs {
    /// Override the song-catalog root
    #[arg(long)]
    pub song_path: Option<PathBuf>,

    /// Override the event-log root
    #[arg(long)]
    pub log_path: Option<PathBuf>,

    /// Load only one of the two data sets
    #[arg(long, value_enum)]
    pub only: Option<EtlTarget>,

    /// Exit non-zero if any file or row failed to load
    #[arg(long)]
    pub fail_on_error: bool,
}

/// Data set selection for `etl --only`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtlTarget {
    /// Song-catalog files
    Songs,
    /// Event-log files
    Logs,
}

impl From<EtlTarget> for DataKind {
    fn from(target: EtlTarget) -> Self {
        match target {
            EtlTarget::Songs => DataKind::Songs,
            EtlTarget::Logs => DataKind::Logs,
        }
    }
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
