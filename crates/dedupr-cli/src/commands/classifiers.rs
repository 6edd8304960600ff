//! Classifiers command - list the classifier catalog.

use colored::Colorize;
use dedupr::{ClassifierRegistry, DatasetType};

use super::CommandResult;

pub fn run(dataset_type: Option<DatasetType>) -> CommandResult {
    let registry = ClassifierRegistry::new();

    for current in DatasetType::ALL {
        if dataset_type.is_some_and(|t| t != current) {
            continue;
        }

        println!("{}", format!("{}:", current).yellow().bold());
        for classifier in registry.for_dataset_type(current) {
            let comparator = classifier
                .comparator
                .map(|c| c.description())
                .unwrap_or("blocking only");
            println!(
                "  {:20} {} {}",
                classifier.id.to_string().cyan(),
                classifier.description,
                format!("[{}]", comparator).dimmed()
            );
        }
        println!();
    }

    Ok(())
}
