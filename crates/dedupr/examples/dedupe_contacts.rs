//! Example: Classify and deduplicate a contact list.
//!
//! Usage:
//!   cargo run --example dedupe_contacts -- <file_path>

use std::env;
use std::path::Path;

use dedupr::classifier::{ClassifierRegistry, DatasetType};
use dedupr::dedup::{CancellationToken, DeduplicationRequest, Deduplicator, ExactBlockMatcher};
use dedupr::operations::ColumnEngine;
use dedupr::suggestion::{MockProvider, SuggestionService};
use dedupr::DatasetLoader;

fn main() -> dedupr::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example dedupe_contacts -- <file_path>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        std::process::exit(1);
    }

    let dataset = DatasetLoader::new().load_file(path)?;
    println!("Loaded {} rows, {} columns", dataset.row_count(), dataset.column_count());

    // Mock provider so the example runs without an API key
    let registry = ClassifierRegistry::new();
    let provider = MockProvider::new();
    let service = SuggestionService::new(&registry, &provider);

    let dataset_type = service
        .detect_dataset_type(&dataset)?
        .unwrap_or(DatasetType::Person);
    println!("Dataset type: {}", dataset_type);

    let suggestions = service.suggest(&dataset, dataset_type)?;
    for s in &suggestions {
        println!("  {:24} -> {}", s.label, s.classification);
    }

    let operations = SuggestionService::into_operations(&suggestions);
    let (classified, report) = ColumnEngine::new(&registry).apply(&dataset, &operations)?;
    println!(
        "Applied {} operations, {} values changed",
        report.operations_applied, report.values_changed
    );

    let request = DeduplicationRequest::new(
        classified
            .columns()
            .iter()
            .filter(|c| registry.is_default_deduplication(c.classification, Some(dataset_type)))
            .map(|c| c.id.clone())
            .collect(),
        dataset_type,
    );
    let response = Deduplicator::new(&registry).deduplicate(
        &classified,
        &request,
        &ExactBlockMatcher::new(),
        &CancellationToken::new(),
    )?;

    println!();
    println!("{}", response.reason);
    println!(
        "{} rows -> {} rows",
        response.original_count, response.deduplicated_count
    );
    for (duplicate, canonical) in response.mapping.iter() {
        println!("  {} duplicates {}", duplicate, canonical);
    }

    Ok(())
}
