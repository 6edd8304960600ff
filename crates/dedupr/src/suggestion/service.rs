//! Validation layer between a dataset and a suggestion provider.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::{ClassifierId, ClassifierRegistry, DatasetType};
use crate::dataset::Dataset;
use crate::error::{DeduprError, OperationError, Result};
use crate::operations::Operation;

use super::prompts;
use super::provider::{
    ClassificationRequest, ClassifierContext, ColumnSample, SuggestionProvider,
    TransformationRequest,
};
use super::tokens::ensure_within_limit;

/// A validated classification suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub column_id: String,
    /// Label of the column, for display.
    pub label: String,
    pub classification: ClassifierId,
}

/// Asks a provider for suggestions and keeps only what the dataset and
/// registry can accept.
pub struct SuggestionService<'a> {
    registry: &'a ClassifierRegistry,
    provider: &'a dyn SuggestionProvider,
}

impl<'a> SuggestionService<'a> {
    pub fn new(registry: &'a ClassifierRegistry, provider: &'a dyn SuggestionProvider) -> Self {
        Self { registry, provider }
    }

    /// Samples of every column that has at least one non-blank value.
    fn column_samples(&self, dataset: &Dataset) -> Vec<ColumnSample> {
        let limit = self.provider.config().sample_size;
        dataset
            .columns()
            .iter()
            .filter_map(|column| {
                let samples: Vec<String> =
                    column.sample(limit).into_iter().map(str::to_string).collect();
                (!samples.is_empty()).then(|| ColumnSample {
                    column_id: column.id.clone(),
                    label: column.label.clone(),
                    samples,
                })
            })
            .collect()
    }

    /// Build the request sent to the provider for classification.
    pub fn classification_request(
        &self,
        dataset: &Dataset,
        dataset_type: DatasetType,
    ) -> ClassificationRequest {
        ClassificationRequest {
            dataset_type,
            columns: self.column_samples(dataset),
            classifiers: self
                .registry
                .for_dataset_type(dataset_type)
                .map(ClassifierContext::from)
                .collect(),
        }
    }

    /// Suggest classifications for the columns of a dataset.
    ///
    /// Suggestions naming an unknown classifier, an unknown column, or a
    /// classifier not allowed for `dataset_type` are dropped, as is any
    /// second suggestion for the same column.
    pub fn suggest(&self, dataset: &Dataset, dataset_type: DatasetType) -> Result<Vec<Suggestion>> {
        let request = self.classification_request(dataset, dataset_type);
        let token_count = ensure_within_limit(
            &prompts::classification_messages(&request),
            self.provider.config().token_limit,
        )?;
        debug!(
            provider = self.provider.name(),
            columns = request.columns.len(),
            token_count,
            "Requesting classification suggestions"
        );

        let raw = self.provider.suggest_classifications(&request)?;
        let received = raw.len();

        let mut seen = HashSet::new();
        let mut suggestions = Vec::new();
        for suggestion in raw {
            let Ok(classification) = suggestion.classification.parse::<ClassifierId>() else {
                warn!(classification = %suggestion.classification, "Dropping unknown classifier");
                continue;
            };
            let allowed = self
                .registry
                .get(classification)
                .is_some_and(|c| c.allows(dataset_type));
            if !allowed {
                warn!(%classification, %dataset_type, "Dropping classifier not allowed for dataset type");
                continue;
            }
            let Some(column) = dataset.column(&suggestion.column_id) else {
                warn!(column_id = %suggestion.column_id, "Dropping suggestion for unknown column");
                continue;
            };
            if !seen.insert(column.id.clone()) {
                warn!(column_id = %column.id, "Dropping repeated suggestion for column");
                continue;
            }
            suggestions.push(Suggestion {
                column_id: column.id.clone(),
                label: column.label.clone(),
                classification,
            });
        }

        info!(
            provider = self.provider.name(),
            received,
            accepted = suggestions.len(),
            "Classification suggestions validated"
        );
        Ok(suggestions)
    }

    /// Turn accepted suggestions into classify operations.
    pub fn into_operations(suggestions: &[Suggestion]) -> Vec<Operation> {
        suggestions
            .iter()
            .map(|s| Operation::ClassifyColumn {
                column_id: s.column_id.clone(),
                classification: s.classification.to_string(),
            })
            .collect()
    }

    /// Ask the provider for a value mapping for one column and return it as
    /// an update operation.
    ///
    /// Only mappings whose source is an existing value and whose target
    /// differs from it are kept.
    pub fn transform_column(&self, dataset: &Dataset, column_id: &str, prompt: &str) -> Result<Operation> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(DeduprError::Config(
                "A prompt is required to transform column values".to_string(),
            ));
        }
        let column = dataset
            .column(column_id)
            .ok_or_else(|| OperationError::ColumnNotFound(column_id.to_string()))?;

        let values: IndexSet<&str> = column
            .values
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
            .collect();

        let request = TransformationRequest {
            column_id: column.id.clone(),
            label: column.label.clone(),
            values: values.iter().map(|v| v.to_string()).collect(),
            prompt: prompt.to_string(),
        };
        ensure_within_limit(
            &prompts::transformation_messages(&request),
            self.provider.config().token_limit,
        )?;

        let mapping = self.provider.generate_transformation(&request)?;
        let proposed = mapping.len();
        let updates: IndexMap<String, String> = mapping
            .into_iter()
            .filter(|(from, to)| values.contains(from.as_str()) && from != to)
            .collect();

        info!(
            column_id = %column.id,
            proposed,
            kept = updates.len(),
            "Value transformation generated"
        );
        Ok(Operation::UpdateColumnValues {
            column_id: column.id.clone(),
            updates,
        })
    }

    /// Ask the provider whether the dataset describes people or companies.
    pub fn detect_dataset_type(&self, dataset: &Dataset) -> Result<Option<DatasetType>> {
        let columns = self.column_samples(dataset);
        if columns.is_empty() {
            return Ok(None);
        }
        ensure_within_limit(
            &prompts::dataset_type_messages(&columns),
            self.provider.config().token_limit,
        )?;
        let detected = self.provider.detect_dataset_type(&columns)?;
        debug!(provider = self.provider.name(), ?detected, "Dataset type detected");
        Ok(detected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::suggestion::mock::MockProvider;
    use crate::suggestion::provider::{LlmConfig, RawSuggestion};

    fn some(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    fn dataset() -> Dataset {
        Dataset::with_generated_row_ids(vec![
            Column::new("mail_1", "Mail", some(&["a@x.org", "b@y.org", "a@x.org"])),
            Column::new("city_1", "City", some(&["nyc", "LA", "nyc"])),
            Column::new("blank_1", "Blank", vec![None, Some("  ".into()), None]),
        ])
        .unwrap()
    }

    #[test]
    fn test_request_skips_blank_columns() {
        let registry = ClassifierRegistry::new();
        let provider = MockProvider::new();
        let service = SuggestionService::new(&registry, &provider);

        let request = service.classification_request(&dataset(), DatasetType::Company);
        let ids: Vec<_> = request.columns.iter().map(|c| c.column_id.as_str()).collect();
        assert_eq!(ids, vec!["mail_1", "city_1"]);
        assert!(request.classifiers.iter().all(|c| c.id.starts_with("company:")));
    }

    #[test]
    fn test_invalid_suggestions_are_dropped() {
        let registry = ClassifierRegistry::new();
        let provider = MockProvider::new().with_suggestions(vec![
            RawSuggestion::new("mail_1", "person:email"),
            RawSuggestion::new("mail_1", "person:website"),
            RawSuggestion::new("city_1", "person:shoe_size"),
            RawSuggestion::new("ghost", "person:phone"),
            RawSuggestion::new("city_1", "company:name"),
        ]);
        let service = SuggestionService::new(&registry, &provider);

        let suggestions = service.suggest(&dataset(), DatasetType::Person).unwrap();
        assert_eq!(
            suggestions,
            vec![Suggestion {
                column_id: "mail_1".into(),
                label: "Mail".into(),
                classification: ClassifierId::PersonEmail,
            }]
        );

        let ops = SuggestionService::into_operations(&suggestions);
        assert_eq!(
            ops,
            vec![Operation::ClassifyColumn {
                column_id: "mail_1".into(),
                classification: "person:email".into(),
            }]
        );
    }

    #[test]
    fn test_token_limit_is_enforced() {
        let registry = ClassifierRegistry::new();
        let provider = MockProvider::with_config(LlmConfig::default().with_token_limit(5));
        let service = SuggestionService::new(&registry, &provider);

        let err = service.suggest(&dataset(), DatasetType::Person).unwrap_err();
        assert!(matches!(err, DeduprError::TokenLimitExceeded { limit: 5, .. }));
    }

    #[test]
    fn test_transform_column_filters_mapping() {
        let registry = ClassifierRegistry::new();
        let mut mapping = IndexMap::new();
        mapping.insert("nyc".to_string(), "New York".to_string());
        mapping.insert("LA".to_string(), "LA".to_string());
        mapping.insert("sf".to_string(), "San Francisco".to_string());
        let provider = MockProvider::new().with_transformations(mapping);
        let service = SuggestionService::new(&registry, &provider);

        let op = service
            .transform_column(&dataset(), "city_1", "Expand city abbreviations")
            .unwrap();
        let Operation::UpdateColumnValues { column_id, updates } = op else {
            panic!("expected an update operation");
        };
        assert_eq!(column_id, "city_1");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates.get("nyc").map(String::as_str), Some("New York"));
    }

    #[test]
    fn test_transform_column_errors() {
        let registry = ClassifierRegistry::new();
        let provider = MockProvider::new();
        let service = SuggestionService::new(&registry, &provider);

        assert!(matches!(
            service.transform_column(&dataset(), "ghost", "uppercase"),
            Err(DeduprError::Operation(OperationError::ColumnNotFound(_)))
        ));
        assert!(matches!(
            service.transform_column(&dataset(), "city_1", "   "),
            Err(DeduprError::Config(_))
        ));
    }

    #[test]
    fn test_detect_dataset_type_uses_samples() {
        let registry = ClassifierRegistry::new();
        let provider = MockProvider::new();
        let service = SuggestionService::new(&registry, &provider);

        let people = Dataset::with_generated_row_ids(vec![Column::new(
            "last_1",
            "Surname",
            some(&["Lovelace"]),
        )])
        .unwrap();
        assert_eq!(
            service.detect_dataset_type(&people).unwrap(),
            Some(DatasetType::Person)
        );
        assert_eq!(service.detect_dataset_type(&dataset()).unwrap(), None);
    }
}
