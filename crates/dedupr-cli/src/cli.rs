//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use dedupr::dedup::TierPreference;
use dedupr::DatasetType;
use std::path::PathBuf;

/// Dedupr: classify, clean and deduplicate contact data
#[derive(Parser)]
#[command(name = "dedupr")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output and debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a CSV/TSV file into a dataset snapshot
    Import {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path for the snapshot (default: <file>.dedupr.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Dataset type (person or company); detected when omitted
        #[arg(short = 't', long)]
        dataset_type: Option<DatasetType>,

        /// Provider used to detect the dataset type
        #[arg(long, default_value = "mock")]
        llm: LlmProviderChoice,
    },

    /// List the available classifiers
    Classifiers {
        /// Only classifiers for this dataset type
        #[arg(short = 't', long)]
        dataset_type: Option<DatasetType>,
    },

    /// Apply a JSON list of column operations to a snapshot
    Apply {
        /// Path to the dataset snapshot
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Path to a JSON array of operations
        #[arg(value_name = "OPERATIONS")]
        operations: PathBuf,

        /// Output path for the updated snapshot (default: overwrite)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Suggest column classifications
    Suggest {
        /// Path to the dataset snapshot
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Dataset type, when the snapshot has none
        #[arg(short = 't', long)]
        dataset_type: Option<DatasetType>,

        /// Suggestion provider
        #[arg(long, default_value = "mock")]
        llm: LlmProviderChoice,

        /// Model to use (provider-specific, e.g., "gpt-4o")
        #[arg(long)]
        model: Option<String>,

        /// Apply the accepted suggestions to the snapshot
        #[arg(long)]
        apply: bool,

        /// Output path for the updated snapshot (default: overwrite)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate value replacements for a column from a prompt
    Transform {
        /// Path to the dataset snapshot
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Column id
        #[arg(value_name = "COLUMN")]
        column: String,

        /// What should happen to the values
        #[arg(short, long)]
        prompt: String,

        /// Suggestion provider
        #[arg(long, default_value = "mock")]
        llm: LlmProviderChoice,

        /// Model to use (provider-specific, e.g., "gpt-4o")
        #[arg(long)]
        model: Option<String>,

        /// Apply the replacements to the snapshot
        #[arg(long)]
        apply: bool,

        /// Output path for the updated snapshot (default: overwrite)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the deduplication plan for a set of columns
    Plan {
        /// Path to the dataset snapshot
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Comma-separated column ids (default: classified columns)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Dataset type, when the snapshot has none
        #[arg(short = 't', long)]
        dataset_type: Option<DatasetType>,

        /// Tier the planner may choose (auto, deterministic, probabilistic)
        #[arg(long, default_value = "auto")]
        tier: TierPreference,
    },

    /// Find duplicate rows
    Dedupe {
        /// Path to the dataset snapshot
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// Comma-separated column ids (default: classified columns)
        #[arg(short, long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Dataset type, when the snapshot has none
        #[arg(short = 't', long)]
        dataset_type: Option<DatasetType>,

        /// Give up after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write the duplicate mapping as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Suggestion provider choice
#[derive(Clone, Debug, Default)]
pub enum LlmProviderChoice {
    /// Heuristic provider, no network access
    #[default]
    Mock,
    /// OpenAI GPT API (requires OPENAI_API_KEY)
    OpenAI,
}

impl std::str::FromStr for LlmProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(LlmProviderChoice::Mock),
            "openai" | "gpt" => Ok(LlmProviderChoice::OpenAI),
            _ => Err(format!("Unknown provider: {}. Use mock or openai.", s)),
        }
    }
}

impl std::fmt::Display for LlmProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderChoice::Mock => write!(f, "mock"),
            LlmProviderChoice::OpenAI => write!(f, "openai"),
        }
    }
}
