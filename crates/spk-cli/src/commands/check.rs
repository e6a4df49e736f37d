//! Check command implementation

use anyhow::{Context, Result};
use spk_db::TableShape;

use crate::cli::GlobalArgs;
use crate::commands::common::{ExitCode, Project, EXIT_CHECK_FAILED};

/// Execute the check command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let project = Project::load(global)?;
    let warehouse = project.open_warehouse()?;
    let shapes = warehouse
        .inspect_tables()
        .context("Failed to inspect warehouse tables")?;
    warehouse.close()?;

    println!("{:<12} {:>8} {:>10}", "TABLE", "COLUMNS", "ROWS");
    for shape in &shapes {
        println!("{}", format_shape(shape));
    }

    let invalid = shapes.iter().filter(|s| !s.is_valid()).count();
    if invalid > 0 {
        println!();
        println!("{} of {} tables failed the check", invalid, shapes.len());
        return Err(ExitCode(EXIT_CHECK_FAILED).into());
    }
    Ok(())
}

fn format_shape(shape: &TableShape) -> String {
    let mark = if shape.is_valid() { "✓" } else { "✗" };
    let columns = match shape.actual_columns {
        Some(n) => format!("{}/{}", n, shape.expected_columns),
        None => "missing".to_string(),
    };
    let rows = shape
        .rows
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!("{} {:<10} {:>8} {:>10}", mark, shape.name, columns, rows)
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
