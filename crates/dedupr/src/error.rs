//! Error types for the dedupr library.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for dedupr operations.
#[derive(Debug, Error)]
pub enum DeduprError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A column operation could not be applied.
    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The external record matcher failed.
    #[error(transparent)]
    Matcher(#[from] MatcherError),

    /// The dataset type cannot change once columns are classified.
    #[error("Cannot change dataset type after columns have been classified")]
    DatasetTypeLocked,

    /// Prompt for the suggestion generator is too large.
    #[error("Token limit exceeded: {token_count} tokens (limit {limit})")]
    TokenLimitExceeded { token_count: usize, limit: usize },

    /// Failure talking to an LLM provider.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot could not be saved or loaded.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structural errors raised while applying column operations.
///
/// Any of these aborts the remainder of an operation batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The operation referenced a column that is not in the dataset.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Unknown operation action name.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Unknown classifier id.
    #[error("Invalid classification: {0}")]
    InvalidClassification(String),

    /// A wire operation is missing a field its action requires.
    #[error("Action '{action}' requires '{field}'")]
    MissingField { action: String, field: &'static str },

    /// Added column values are not aligned with the dataset rows.
    #[error("Column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// The reserved row identity column cannot be edited.
    #[error("Column '{0}' is reserved")]
    ReservedColumn(String),
}

/// Reasons a deduplication plan could not be built.
///
/// These are data-driven outcomes, reported back to the caller as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningFailure {
    /// The request named no columns.
    NoColumnsSelected,
    /// None of the selected columns carries a usable classification.
    NoClassifiedColumns,
    /// No blocking rule can be satisfied by the classified columns.
    NoMatchingRules,
    /// The probabilistic tier was needed but no column has a comparator.
    NoComparisons,
}

impl PlanningFailure {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PlanningFailure::NoColumnsSelected => "no_columns_selected",
            PlanningFailure::NoClassifiedColumns => "no_classified_columns",
            PlanningFailure::NoMatchingRules => "no_matching_rules",
            PlanningFailure::NoComparisons => "no_comparisons",
        }
    }

    /// Human-readable explanation suitable for display.
    pub fn reason(&self) -> &'static str {
        match self {
            PlanningFailure::NoColumnsSelected => "No columns were selected for deduplication",
            PlanningFailure::NoClassifiedColumns => {
                "None of the selected columns has a classification for this dataset type"
            }
            PlanningFailure::NoMatchingRules => {
                "The selected columns are not enough to compare records"
            }
            PlanningFailure::NoComparisons => {
                "None of the selected columns supports fuzzy comparison"
            }
        }
    }
}

impl std::fmt::Display for PlanningFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Errors surfaced by a record matcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    /// The caller cancelled the run.
    #[error("Matching was cancelled")]
    Cancelled,

    /// The caller-supplied deadline passed.
    #[error("Matching timed out after {elapsed:?}")]
    TimedOut { elapsed: Duration },

    /// The matcher cannot execute this kind of spec.
    #[error("Unsupported match spec: {0}")]
    Unsupported(String),

    /// The matching backend failed.
    #[error("Matcher backend error: {0}")]
    Backend(String),
}

/// Result type alias for dedupr operations.
pub type Result<T> = std::result::Result<T, DeduprError>;
