//! Plan command - show how a deduplication would run.

use std::path::PathBuf;

use colored::Colorize;
use dedupr::dedup::{DeduplicationPlanner, PlannerConfig, TierPreference};
use dedupr::{ClassifierRegistry, DatasetType};

use super::{CommandResult, load_snapshot, resolve_dataset_type, selected_columns};

pub fn run(
    snapshot: PathBuf,
    columns: Vec<String>,
    dataset_type: Option<DatasetType>,
    tier: TierPreference,
) -> CommandResult {
    let mut dataset = load_snapshot(&snapshot)?;
    let dataset_type = resolve_dataset_type(&mut dataset, dataset_type)?;

    let registry = ClassifierRegistry::new();
    let columns = selected_columns(&registry, &dataset, dataset_type, columns);
    let planner =
        DeduplicationPlanner::with_config(&registry, PlannerConfig::default().with_tier_preference(tier));

    let spec = match planner.plan(&dataset.column_defs(), &columns, dataset_type) {
        Ok(spec) => spec,
        Err(failure) => {
            println!(
                "{} {} ({})",
                "Cannot plan:".red().bold(),
                failure.reason(),
                failure.code().dimmed()
            );
            return Ok(());
        }
    };

    println!(
        "{} {} matching over {} columns",
        "Plan:".cyan().bold(),
        spec.tier.to_string().white().bold(),
        columns.len()
    );
    println!();

    println!("{}", "Blocking rules:".yellow().bold());
    for (rule, predicate) in spec.blocking_rules.iter().zip(spec.render_predicates()) {
        println!("  {:36} {}", rule.name.white(), predicate.dimmed());
    }

    if !spec.comparators.is_empty() {
        println!();
        println!("{}", "Comparators:".yellow().bold());
        for comparator in &spec.comparators {
            println!(
                "  {:36} {}",
                comparator.column_id.white(),
                comparator.kind.description()
            );
        }
        println!("  match threshold: {}", spec.match_threshold);
    }

    Ok(())
}
