//! Transform command - generate value replacements for one column.

use std::path::PathBuf;

use colored::Colorize;
use dedupr::suggestion::SuggestionService;
use dedupr::{ClassifierRegistry, ColumnEngine, Operation};

use super::{CommandResult, build_provider, load_snapshot, output_path, save_snapshot};
use crate::cli::LlmProviderChoice;

pub fn run(
    snapshot: PathBuf,
    column: String,
    prompt: String,
    llm: LlmProviderChoice,
    model: Option<String>,
    apply: bool,
    output: Option<PathBuf>,
) -> CommandResult {
    let dataset = load_snapshot(&snapshot)?;

    let registry = ClassifierRegistry::new();
    let provider = build_provider(&llm, model)?;
    let service = SuggestionService::new(&registry, provider.as_ref());

    let operation = service.transform_column(&dataset, &column, &prompt)?;
    let Operation::UpdateColumnValues { updates, .. } = &operation else {
        return Err("Provider did not return value updates".into());
    };

    if updates.is_empty() {
        println!("{} No values would change.", "Note:".yellow().bold());
        return Ok(());
    }

    println!(
        "{} {} replacements for {}",
        "Generated".cyan().bold(),
        updates.len().to_string().white().bold(),
        column.white()
    );
    for (from, to) in updates {
        println!("  {} {} {}", from, "→".dimmed(), to.green());
    }

    if !apply {
        println!();
        println!("Re-run with {} to apply these replacements.", "--apply".cyan());
        return Ok(());
    }

    let (updated, report) = ColumnEngine::new(&registry).apply(&dataset, &[operation])?;
    println!(
        "Updated {} values",
        report.values_changed.to_string().white().bold()
    );

    save_snapshot(&updated, &output_path(&snapshot, output))
}
