//! Classification and transformation suggestions.
//!
//! A [`SuggestionProvider`] proposes classifications for columns, value
//! mappings for a column, and the dataset type. Provider output is
//! untrusted: the [`SuggestionService`] checks it against the classifier
//! registry and the dataset before turning it into operations.
//!
//! # Example
//!
//! ```
//! use dedupr::classifier::{ClassifierRegistry, DatasetType};
//! use dedupr::dataset::{Column, Dataset};
//! use dedupr::suggestion::{MockProvider, SuggestionService};
//!
//! let dataset = Dataset::with_generated_row_ids(vec![Column::new(
//!     "email_1",
//!     "Email",
//!     vec![Some("ada@example.com".to_string())],
//! )])
//! .unwrap();
//!
//! let registry = ClassifierRegistry::new();
//! let provider = MockProvider::new();
//! let service = SuggestionService::new(&registry, &provider);
//! let suggestions = service.suggest(&dataset, DatasetType::Person).unwrap();
//! assert_eq!(suggestions[0].classification.as_str(), "person:email");
//! ```

mod mock;
mod openai;
mod prompts;
mod provider;
mod service;
mod tokens;

pub use mock::MockProvider;
pub use openai::{API_KEY_VAR, OpenAIProvider};
pub use prompts::{ChatMessage, classification_messages, dataset_type_messages, transformation_messages};
pub use provider::{
    ClassificationRequest, ClassifierContext, ColumnSample, LlmConfig, RawSuggestion,
    SuggestionProvider, TransformationRequest,
};
pub use service::{Suggestion, SuggestionService};
pub use tokens::{ensure_within_limit, estimate_message_tokens, estimate_tokens};
