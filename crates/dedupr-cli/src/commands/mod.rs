//! CLI command implementations.

pub mod apply;
pub mod classifiers;
pub mod dedupe;
pub mod import;
pub mod plan;
pub mod suggest;
pub mod transform;

use std::path::{Path, PathBuf};

use colored::Colorize;
use dedupr::suggestion::{LlmConfig, MockProvider, OpenAIProvider, SuggestionProvider};
use dedupr::{ClassifierRegistry, Dataset, DatasetType};

use crate::cli::LlmProviderChoice;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load a snapshot, failing with a readable message when it is missing.
pub fn load_snapshot(path: &Path) -> Result<Dataset, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!(
            "Snapshot not found: {}\nRun 'dedupr import <file>' first.",
            path.display()
        )
        .into());
    }
    Ok(Dataset::load(path)?)
}

/// Save a snapshot and report where it went.
pub fn save_snapshot(dataset: &Dataset, path: &Path) -> CommandResult {
    dataset.save(path)?;
    println!(
        "{} {}",
        "Saved snapshot to".green(),
        path.display().to_string().white()
    );
    Ok(())
}

/// Resolve the output path: explicit, or overwrite the input.
pub fn output_path(input: &Path, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| input.to_path_buf())
}

/// Dataset type from the flag, else from the snapshot.
///
/// A flag that disagrees with the snapshot updates it, which fails once
/// columns are classified.
pub fn resolve_dataset_type(
    dataset: &mut Dataset,
    flag: Option<DatasetType>,
) -> Result<DatasetType, Box<dyn std::error::Error>> {
    match (flag, dataset.dataset_type()) {
        (Some(flag), Some(current)) if flag == current => Ok(flag),
        (Some(flag), _) => {
            dataset.set_dataset_type(flag)?;
            Ok(flag)
        }
        (None, Some(current)) => Ok(current),
        (None, None) => {
            Err("Dataset type is not set. Pass --dataset-type person|company.".into())
        }
    }
}

/// Build the requested suggestion provider.
pub fn build_provider(
    choice: &LlmProviderChoice,
    model: Option<String>,
) -> Result<Box<dyn SuggestionProvider>, Box<dyn std::error::Error>> {
    let mut config = LlmConfig::default();
    if let Some(model) = model {
        config = config.with_model(model);
    }

    Ok(match choice {
        LlmProviderChoice::Mock => Box::new(MockProvider::with_config(config)),
        LlmProviderChoice::OpenAI => Box::new(OpenAIProvider::from_env(config)?),
    })
}

/// Columns to deduplicate on: the explicit list, or every column whose
/// classification is pre-selected for the dataset type.
pub fn selected_columns(
    registry: &ClassifierRegistry,
    dataset: &Dataset,
    dataset_type: DatasetType,
    columns: Vec<String>,
) -> Vec<String> {
    if !columns.is_empty() {
        return columns;
    }
    dataset
        .columns()
        .iter()
        .filter(|c| registry.is_default_deduplication(c.classification, Some(dataset_type)))
        .map(|c| c.id.clone())
        .collect()
}
