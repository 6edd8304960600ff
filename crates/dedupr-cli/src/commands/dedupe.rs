//! Dedupe command - find duplicate rows with the exact-block matcher.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use dedupr::dedup::{DedupConfig, DeduplicationRequest, Deduplicator, ExactBlockMatcher};
use dedupr::{ClassifierRegistry, DatasetType};
use tracing::debug;

use super::{CommandResult, load_snapshot, resolve_dataset_type, selected_columns};

pub fn run(
    snapshot: PathBuf,
    columns: Vec<String>,
    dataset_type: Option<DatasetType>,
    timeout_secs: Option<u64>,
    output: Option<PathBuf>,
    json_output: bool,
) -> CommandResult {
    let mut dataset = load_snapshot(&snapshot)?;
    let dataset_type = resolve_dataset_type(&mut dataset, dataset_type)?;

    let registry = ClassifierRegistry::new();
    let columns = selected_columns(&registry, &dataset, dataset_type, columns);

    let mut config = DedupConfig::default();
    if let Some(secs) = timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let dedup = Deduplicator::with_config(&registry, config);

    // Ctrl-C cancels the running match
    let cancel = dedup.cancellation_token();
    let handle = cancel.clone();
    ctrlc::set_handler(move || {
        debug!("Interrupt received, cancelling");
        handle.cancel();
    })?;

    let request = DeduplicationRequest::new(columns, dataset_type);
    let response = dedup.deduplicate(&dataset, &request, &ExactBlockMatcher::new(), &cancel)?;

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&response)?)
            .map_err(|e| format!("Cannot write {}: {}", path.display(), e))?;
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(code) = response.error_code {
        println!(
            "{} {} ({})",
            "Not deduplicated:".yellow().bold(),
            response.reason,
            code.code().dimmed()
        );
        return Ok(());
    }

    println!("{}", response.reason.cyan().bold());
    println!(
        "{} rows → {} rows",
        response.original_count.to_string().white(),
        response.deduplicated_count.to_string().green().bold()
    );

    if !response.mapping.is_empty() {
        println!();
        for (duplicate, canonical) in response.mapping.iter() {
            println!("  {} {} {}", duplicate.red(), "→".dimmed(), canonical.green());
        }
    }

    Ok(())
}
