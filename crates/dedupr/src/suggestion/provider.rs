//! Suggestion provider trait and types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, DatasetType};
use crate::error::Result;

/// Sample of one column sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSample {
    pub column_id: String,
    pub label: String,
    /// First non-blank values of the column.
    pub samples: Vec<String>,
}

/// A classifier offered to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierContext {
    /// Namespaced classifier id.
    pub id: String,
    /// What columns this classifier recognizes.
    pub situation: String,
}

impl From<&Classifier> for ClassifierContext {
    fn from(classifier: &Classifier) -> Self {
        Self {
            id: classifier.id.to_string(),
            situation: classifier.situation.to_string(),
        }
    }
}

/// Input for classification suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub dataset_type: DatasetType,
    pub columns: Vec<ColumnSample>,
    /// Classifiers allowed for the dataset type.
    pub classifiers: Vec<ClassifierContext>,
}

/// A classification as returned by a provider, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSuggestion {
    pub column_id: String,
    pub classification: String,
}

impl RawSuggestion {
    pub fn new(column_id: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            classification: classification.into(),
        }
    }
}

/// Input for a value transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformationRequest {
    pub column_id: String,
    pub label: String,
    /// Distinct non-blank values of the column, in first-seen order.
    pub values: Vec<String>,
    /// What the user wants done to the values.
    pub prompt: String,
}

/// Configuration for suggestion providers.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model to use (e.g., "gpt-4o").
    pub model: String,

    /// Maximum tokens in response.
    pub max_tokens: usize,

    /// Temperature for generation (0.0-1.0).
    pub temperature: f64,

    /// Largest estimated prompt size accepted, in tokens.
    pub token_limit: usize,

    /// Values sampled per column for classification.
    pub sample_size: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 2048,
            temperature: 0.0,
            token_limit: 8000,
            sample_size: 10,
        }
    }
}

impl LlmConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_token_limit(mut self, token_limit: usize) -> Self {
        self.token_limit = token_limit;
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }
}

/// Trait for suggestion providers.
///
/// Implementations must be thread-safe (Send + Sync). Output is
/// untrusted; callers validate it against the registry and dataset.
pub trait SuggestionProvider: Send + Sync {
    /// Propose at most one classification per column.
    fn suggest_classifications(&self, request: &ClassificationRequest) -> Result<Vec<RawSuggestion>>;

    /// Propose replacements for column values.
    ///
    /// # Returns
    /// Mapping from existing value to replacement
    fn generate_transformation(
        &self,
        request: &TransformationRequest,
    ) -> Result<IndexMap<String, String>>;

    /// Guess whether the columns describe people or companies.
    fn detect_dataset_type(&self, columns: &[ColumnSample]) -> Result<Option<DatasetType>>;

    /// Get the configuration for this provider.
    fn config(&self) -> &LlmConfig;

    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;
}
