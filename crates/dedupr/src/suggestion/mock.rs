//! Offline provider driven by column labels and sample values.

use indexmap::IndexMap;

use crate::classifier::DatasetType;
use crate::error::Result;

use super::provider::{
    ClassificationRequest, ColumnSample, LlmConfig, RawSuggestion, SuggestionProvider,
    TransformationRequest,
};

/// Mock provider that returns predictable responses for tests and offline use.
///
/// Without canned responses, it classifies columns from their labels and
/// samples and transforms values by the case words in the prompt.
pub struct MockProvider {
    config: LlmConfig,
    suggestions: Option<Vec<RawSuggestion>>,
    transformations: Option<IndexMap<String, String>>,
}

impl MockProvider {
    /// Create a new mock provider.
    pub fn new() -> Self {
        Self::with_config(LlmConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: LlmConfig) -> Self {
        Self {
            config,
            suggestions: None,
            transformations: None,
        }
    }

    /// Always return these classification suggestions.
    pub fn with_suggestions(mut self, suggestions: Vec<RawSuggestion>) -> Self {
        self.suggestions = Some(suggestions);
        self
    }

    /// Always return this value mapping.
    pub fn with_transformations(mut self, transformations: IndexMap<String, String>) -> Self {
        self.transformations = Some(transformations);
        self
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionProvider for MockProvider {
    fn suggest_classifications(&self, request: &ClassificationRequest) -> Result<Vec<RawSuggestion>> {
        if let Some(ref suggestions) = self.suggestions {
            return Ok(suggestions.clone());
        }

        Ok(request
            .columns
            .iter()
            .filter_map(|column| {
                let kind = guess_kind(column)?;
                let classification = match (request.dataset_type, kind) {
                    (DatasetType::Person, Kind::Organization) => return None,
                    (DatasetType::Company, Kind::FirstName | Kind::LastName | Kind::Role) => {
                        return None;
                    }
                    (DatasetType::Company, Kind::FullName) => "company:name".to_string(),
                    (dataset_type, kind) => {
                        format!("{}:{}", dataset_type.as_str().to_lowercase(), kind.suffix())
                    }
                };
                Some(RawSuggestion::new(column.column_id.clone(), classification))
            })
            .collect())
    }

    fn generate_transformation(
        &self,
        request: &TransformationRequest,
    ) -> Result<IndexMap<String, String>> {
        if let Some(ref transformations) = self.transformations {
            return Ok(transformations.clone());
        }

        let prompt = request.prompt.to_lowercase();
        let transform: fn(&str) -> String = if prompt.contains("upper") {
            |v| v.trim().to_uppercase()
        } else if prompt.contains("lower") {
            |v| v.trim().to_lowercase()
        } else {
            |v| v.trim().to_string()
        };

        Ok(request
            .values
            .iter()
            .map(|value| (value.clone(), transform(value)))
            .collect())
    }

    fn detect_dataset_type(&self, columns: &[ColumnSample]) -> Result<Option<DatasetType>> {
        let kinds: Vec<Kind> = columns.iter().filter_map(guess_kind).collect();
        if kinds
            .iter()
            .any(|k| matches!(k, Kind::FirstName | Kind::LastName | Kind::Role))
        {
            Ok(Some(DatasetType::Person))
        } else if kinds.contains(&Kind::Organization) {
            Ok(Some(DatasetType::Company))
        } else {
            Ok(None)
        }
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    FullName,
    FirstName,
    LastName,
    Organization,
    Email,
    Phone,
    Role,
    Social,
    Website,
}

impl Kind {
    fn suffix(&self) -> &'static str {
        match self {
            Kind::FullName | Kind::Organization => "name",
            Kind::FirstName => "first_name",
            Kind::LastName => "last_name",
            Kind::Email => "email",
            Kind::Phone => "phone",
            Kind::Role => "role",
            Kind::Social => "social",
            Kind::Website => "website",
        }
    }
}

fn guess_kind(column: &ColumnSample) -> Option<Kind> {
    let label = column.label.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| label.contains(w));
    let most_samples = |pred: fn(&str) -> bool| {
        !column.samples.is_empty()
            && column.samples.iter().filter(|s| pred(s)).count() * 2 > column.samples.len()
    };

    if has(&["email", "e-mail", "mail"]) || most_samples(|s| s.contains('@') && s.contains('.')) {
        Some(Kind::Email)
    } else if has(&["phone", "mobile", "tel", "fax"]) {
        Some(Kind::Phone)
    } else if has(&["linkedin", "twitter", "social", "handle"]) || most_samples(|s| s.starts_with('@')) {
        Some(Kind::Social)
    } else if has(&["website", "url", "domain", "homepage"])
        || most_samples(|s| s.starts_with("http") || s.starts_with("www."))
    {
        Some(Kind::Website)
    } else if has(&["first"]) {
        Some(Kind::FirstName)
    } else if has(&["last", "surname"]) {
        Some(Kind::LastName)
    } else if has(&["company", "organization", "organisation", "employer"]) {
        Some(Kind::Organization)
    } else if has(&["title", "role", "position"]) {
        Some(Kind::Role)
    } else if has(&["name"]) {
        Some(Kind::FullName)
    } else {
        None
    }
}
