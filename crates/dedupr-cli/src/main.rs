//! Dedupr CLI - column classification and deduplication for contact data.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands};
use logging::{LogConfig, init_logging};

fn main() {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbose(cli.verbose));

    let result = match cli.command {
        Commands::Import {
            file,
            output,
            dataset_type,
            llm,
        } => commands::import::run(file, output, dataset_type, llm, cli.verbose),

        Commands::Classifiers { dataset_type } => commands::classifiers::run(dataset_type),

        Commands::Apply {
            snapshot,
            operations,
            output,
        } => commands::apply::run(snapshot, operations, output, cli.verbose),

        Commands::Suggest {
            snapshot,
            dataset_type,
            llm,
            model,
            apply,
            output,
        } => commands::suggest::run(snapshot, dataset_type, llm, model, apply, output),

        Commands::Transform {
            snapshot,
            column,
            prompt,
            llm,
            model,
            apply,
            output,
        } => commands::transform::run(snapshot, column, prompt, llm, model, apply, output),

        Commands::Plan {
            snapshot,
            columns,
            dataset_type,
            tier,
        } => commands::plan::run(snapshot, columns, dataset_type, tier),

        Commands::Dedupe {
            snapshot,
            columns,
            dataset_type,
            timeout_secs,
            output,
            json,
        } => commands::dedupe::run(snapshot, columns, dataset_type, timeout_secs, output, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
