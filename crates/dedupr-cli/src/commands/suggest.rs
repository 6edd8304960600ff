//! Suggest command - ask a provider for column classifications.

use std::path::PathBuf;

use colored::Colorize;
use dedupr::suggestion::SuggestionService;
use dedupr::{ClassifierRegistry, ColumnEngine, DatasetType};

use super::{CommandResult, build_provider, load_snapshot, output_path, resolve_dataset_type, save_snapshot};
use crate::cli::LlmProviderChoice;

pub fn run(
    snapshot: PathBuf,
    dataset_type: Option<DatasetType>,
    llm: LlmProviderChoice,
    model: Option<String>,
    apply: bool,
    output: Option<PathBuf>,
) -> CommandResult {
    let mut dataset = load_snapshot(&snapshot)?;
    let dataset_type = resolve_dataset_type(&mut dataset, dataset_type)?;

    let registry = ClassifierRegistry::new();
    let provider = build_provider(&llm, model)?;
    let service = SuggestionService::new(&registry, provider.as_ref());

    println!(
        "{} {} columns with {}",
        "Classifying".cyan().bold(),
        dataset.column_count().to_string().white().bold(),
        provider.name().white()
    );

    let suggestions = service.suggest(&dataset, dataset_type)?;
    if suggestions.is_empty() {
        println!("{} No classifications suggested.", "Note:".yellow().bold());
        return Ok(());
    }

    for suggestion in &suggestions {
        println!(
            "  {:24} {:30} {}",
            suggestion.label,
            suggestion.column_id.dimmed(),
            suggestion.classification.to_string().green()
        );
    }

    if !apply {
        println!();
        println!("Re-run with {} to apply these classifications.", "--apply".cyan());
        return Ok(());
    }

    let operations = SuggestionService::into_operations(&suggestions);
    let (updated, report) = ColumnEngine::new(&registry).apply(&dataset, &operations)?;
    println!(
        "Applied {} classifications ({} values changed)",
        report.operations_applied.to_string().white().bold(),
        report.values_changed
    );

    save_snapshot(&updated, &output_path(&snapshot, output))
}
