//! Apply command - apply a batch of column operations to a snapshot.

use std::path::PathBuf;

use colored::Colorize;
use dedupr::operations::{Operation, OperationRequest};
use dedupr::{ClassifierRegistry, ColumnEngine};

use super::{CommandResult, load_snapshot, output_path, save_snapshot};

pub fn run(
    snapshot: PathBuf,
    operations: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
) -> CommandResult {
    let dataset = load_snapshot(&snapshot)?;

    let contents = std::fs::read_to_string(&operations)
        .map_err(|e| format!("Cannot read {}: {}", operations.display(), e))?;
    let requests: Vec<OperationRequest> = serde_json::from_str(&contents)?;
    let operations = requests
        .into_iter()
        .map(OperationRequest::into_operation)
        .collect::<Result<Vec<Operation>, _>>()?;

    if operations.is_empty() {
        println!("{} No operations to apply.", "Warning:".yellow().bold());
        return Ok(());
    }

    println!(
        "{} {} operations",
        "Applying".cyan().bold(),
        operations.len().to_string().white().bold()
    );

    let registry = ClassifierRegistry::new();
    let (updated, report) = ColumnEngine::new(&registry).apply(&dataset, &operations)?;

    if verbose {
        for change in &report.changes {
            println!(
                "  {} {} ({} values)",
                "•".cyan(),
                change.description,
                change.values_changed
            );
        }
    }

    println!(
        "{} values changed, {} columns added, {} columns removed",
        report.values_changed.to_string().white().bold(),
        report.columns_added.to_string().green(),
        report.columns_removed.to_string().red()
    );

    save_snapshot(&updated, &output_path(&snapshot, output))
}
