//! Create-tables command implementation

use anyhow::Result;
use spk_db::SchemaReport;

use crate::cli::GlobalArgs;
use crate::commands::common::{ExitCode, Project, EXIT_SCHEMA_FAILED};

/// Execute the create-tables command.
///
/// Drops all five tables, then creates them. A failing statement is reported
/// and the remaining statements still run.
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let warehouse = project.open_warehouse()?;
    log::info!("Resetting warehouse at {}", project.database_path());

    let dropped = warehouse.drop_tables();
    print_report("Dropped", &dropped);
    let created = warehouse.create_tables();
    print_report("Created", &created);

    warehouse.close()?;

    if !dropped.is_success() || !created.is_success() {
        return Err(ExitCode(EXIT_SCHEMA_FAILED).into());
    }
    Ok(())
}

fn print_report(verb: &str, report: &SchemaReport) {
    println!("{} {} tables", verb, report.applied.len());
    for err in &report.failed {
        println!("  ✗ {}", err);
    }
}

#[cfg(test)]
#[path = "create_tables_test.rs"]
mod tests;
