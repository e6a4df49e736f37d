//! ETL command implementation

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use spk_etl::{DataKind, FileReport, Pipeline, RunReport};
use std::path::PathBuf;

use crate::cli::{EtlArgs, GlobalArgs};
use crate::commands::common::{ExitCode, Project, EXIT_LOAD_ERRORS};

/// Execute the etl command.
///
/// Songs are loaded before logs so that play events can resolve their song
/// and artist keys.
pub fn execute(args: &EtlArgs, global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let warehouse = project.open_warehouse()?;

    let shapes = warehouse
        .inspect_tables()
        .context("Failed to inspect warehouse tables")?;
    let missing: Vec<&str> = shapes
        .iter()
        .filter(|s| !s.is_valid())
        .map(|s| s.name)
        .collect();
    if !missing.is_empty() {
        bail!(
            "Warehouse tables missing or malformed: {} (run `spk create-tables` first)",
            missing.join(", ")
        );
    }

    let pipeline = Pipeline::new(&warehouse, &project.config);
    let mut total = RunReport::default();

    for kind in passes(args) {
        let root = data_root(args, &project, kind);
        let files = pipeline
            .discover(&root)
            .with_context(|| format!("Failed to discover {} files", kind))?;

        if !global.quiet {
            println!("Loading {} {} files from {}", files.len(), kind, root.display());
        }

        let progress = if global.quiet {
            None
        } else {
            Some(progress_bar(files.len()))
        };
        let report = pipeline.process_files(kind, &files, |p| {
            if let Some(pb) = &progress {
                pb.set_message(file_name(p.report));
                pb.inc(1);
            }
        });
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        print_run_summary(kind, &report);
        total.merge(report);
    }

    warehouse.close()?;

    if args.fail_on_error && !total.is_clean() {
        return Err(ExitCode(EXIT_LOAD_ERRORS).into());
    }
    Ok(())
}

fn passes(args: &EtlArgs) -> Vec<DataKind> {
    match args.only {
        Some(target) => vec![target.into()],
        None => vec![DataKind::Songs, DataKind::Logs],
    }
}

/// Command-line roots are taken as given; configured roots are relative to
/// the project directory.
fn data_root(args: &EtlArgs, project: &Project, kind: DataKind) -> PathBuf {
    let (override_path, configured) = match kind {
        DataKind::Songs => (
            &args.song_path,
            project.config.song_path_absolute(&project.root),
        ),
        DataKind::Logs => (&args.log_path, project.config.log_path_absolute(&project.root)),
    };
    override_path.clone().unwrap_or(configured)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn file_name(report: &FileReport) -> String {
    report
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn print_run_summary(kind: DataKind, report: &RunReport) {
    for file in report.files.iter().filter(|f| !f.is_clean()) {
        let status = if file.committed {
            "partially loaded"
        } else {
            "rolled back"
        };
        println!(
            "  ✗ {} ({}, {} failed)",
            file.path.display(),
            status,
            file.failed
        );
        for message in &file.errors {
            println!("      {}", message);
        }
    }

    println!(
        "{}: {} files processed, {} with errors; {} rows inserted, {} skipped, {} failed",
        kind,
        report.files_processed(),
        report.files_with_errors(),
        report.rows_inserted(),
        report.rows_skipped(),
        report.rows_failed()
    );
    if kind == DataKind::Logs {
        println!(
            "  {} non-play events filtered, {} song plays without a catalog match",
            report.events_filtered(),
            report.songplays_unmatched()
        );
    }
}

#[cfg(test)]
#[path = "etl_test.rs"]
mod tests;
