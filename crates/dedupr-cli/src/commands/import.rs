//! Import command - load a delimited file into a dataset snapshot.

use std::path::PathBuf;

use colored::Colorize;
use dedupr::dataset::LoaderConfig;
use dedupr::suggestion::SuggestionService;
use dedupr::{ClassifierRegistry, DatasetLoader, DatasetType, DeduprError};

use super::{CommandResult, build_provider, save_snapshot};
use crate::cli::LlmProviderChoice;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    dataset_type: Option<DatasetType>,
    llm: LlmProviderChoice,
    verbose: bool,
) -> CommandResult {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    println!(
        "{} {}",
        "Importing".cyan().bold(),
        file.display().to_string().white()
    );

    let mut config = LoaderConfig::default();
    if let Some(dataset_type) = dataset_type {
        config = config.with_dataset_type(dataset_type);
    }
    let mut dataset = DatasetLoader::with_config(config).load_file(&file)?;

    println!(
        "Loaded {} rows, {} columns",
        dataset.row_count().to_string().white().bold(),
        dataset.column_count().to_string().white().bold()
    );

    if dataset_type.is_none() {
        let registry = ClassifierRegistry::new();
        let provider = build_provider(&llm, None)?;
        let service = SuggestionService::new(&registry, provider.as_ref());

        match service.detect_dataset_type(&dataset) {
            Ok(Some(detected)) => {
                dataset.set_dataset_type(detected)?;
                println!("Detected dataset type: {}", detected.to_string().green());
            }
            Ok(None) => println!(
                "{} Could not detect the dataset type; pass --dataset-type later.",
                "Note:".yellow().bold()
            ),
            Err(DeduprError::TokenLimitExceeded { token_count, limit }) => println!(
                "{} Dataset too large to detect its type (Token count: {}, Limit: {}).",
                "Note:".yellow().bold(),
                token_count,
                limit
            ),
            Err(e) => return Err(e.into()),
        }
    }

    if verbose {
        println!();
        println!("{}", "Columns:".yellow().bold());
        for column in dataset.columns() {
            println!("  {:30} {}", column.id, column.label);
        }
        println!();
    }

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}.dedupr.json", stem))
    });
    save_snapshot(&dataset, &output_path)
}
