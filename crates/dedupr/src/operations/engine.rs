//! Engine that applies ordered operation batches to a dataset.

use tracing::{debug, info, warn};

use crate::classifier::{Classification, ClassifierId, ClassifierRegistry};
use crate::dataset::{Column, Dataset, ROW_ID_COLUMN, generate_unique_column_id};
use crate::error::{OperationError, Result};

use super::operation::{ApplyReport, Operation, OperationChange};

/// Applies column operations using a shared classifier registry.
#[derive(Debug, Clone, Copy)]
pub struct ColumnEngine<'r> {
    registry: &'r ClassifierRegistry,
}

impl<'r> ColumnEngine<'r> {
    /// Create an engine bound to a registry.
    pub fn new(registry: &'r ClassifierRegistry) -> Self {
        Self { registry }
    }

    /// Apply operations in order, returning the new dataset.
    ///
    /// The input dataset is never modified. The first failing operation
    /// aborts the batch and nothing of it is returned.
    pub fn apply(&self, dataset: &Dataset, operations: &[Operation]) -> Result<(Dataset, ApplyReport)> {
        let mut working = dataset.clone();
        let mut report = ApplyReport::new();

        for (index, operation) in operations.iter().enumerate() {
            if let Err(e) = self.apply_operation(&mut working, operation, &mut report) {
                warn!(
                    index,
                    action = operation.action(),
                    error = %e,
                    "Operation batch aborted"
                );
                return Err(e.into());
            }
            report.operations_applied += 1;
        }

        info!(
            operations = report.operations_applied,
            values_changed = report.values_changed,
            columns_added = report.columns_added,
            columns_removed = report.columns_removed,
            "Applied operation batch"
        );
        Ok((working, report))
    }

    fn apply_operation(
        &self,
        dataset: &mut Dataset,
        operation: &Operation,
        report: &mut ApplyReport,
    ) -> std::result::Result<(), OperationError> {
        debug!(action = operation.action(), column = ?operation.column_id(), "Applying operation");

        match operation {
            Operation::RemoveColumn { column_id } => {
                let removed = dataset.remove_column(column_id)?;
                report.columns_removed += 1;
                report.add_change(OperationChange {
                    description: operation.description(),
                    column_id: removed.id,
                    values_changed: 0,
                });
            }

            Operation::AddColumn {
                label,
                values,
                classification,
            } => {
                let id = generate_unique_column_id(label, |id| dataset.is_column_id_taken(id));
                let mut column = Column::new(id.clone(), label.clone(), values.clone());
                column.classification = *classification;
                dataset.push_column(column)?;
                report.columns_added += 1;
                report.add_change(OperationChange {
                    description: operation.description(),
                    column_id: id,
                    values_changed: 0,
                });
            }

            Operation::ClassifyColumn {
                column_id,
                classification,
            } => {
                let classifier_id = classification
                    .parse::<ClassifierId>()
                    .map_err(|_| OperationError::InvalidClassification(classification.clone()))?;
                let bound = self
                    .registry
                    .bind(classifier_id, column_id)
                    .ok_or_else(|| OperationError::InvalidClassification(classification.clone()))?;
                let column = find_column(dataset, column_id)?;

                match bound.classify(column) {
                    Classification::Derived(derived) => {
                        debug!(
                            column = %column_id,
                            classification = %classifier_id,
                            derived = derived.len(),
                            "Classification expands into derived operations"
                        );
                        for derived_op in &derived {
                            self.apply_operation(dataset, derived_op, report)?;
                        }
                    }
                    Classification::InPlace(values) => {
                        let column = dataset.column_mut(column_id)?;
                        let changed = count_changed(&column.values, &values);
                        column.classification = Some(classifier_id);
                        column.values = values;
                        report.add_change(OperationChange {
                            description: operation.description(),
                            column_id: column_id.clone(),
                            values_changed: changed,
                        });
                    }
                }
            }

            Operation::UpdateColumnValues { column_id, updates } => {
                let column = dataset.column_mut(column_id)?;
                let mut changed = 0;
                for value in column.values.iter_mut().flatten() {
                    if let Some(replacement) = updates.get(value.as_str()) {
                        if *replacement != *value {
                            *value = replacement.clone();
                            changed += 1;
                        }
                    }
                }
                report.add_change(OperationChange {
                    description: operation.description(),
                    column_id: column_id.clone(),
                    values_changed: changed,
                });
            }
        }

        Ok(())
    }
}

fn find_column<'d>(dataset: &'d Dataset, column_id: &str) -> std::result::Result<&'d Column, OperationError> {
    if column_id == ROW_ID_COLUMN {
        return Err(OperationError::ReservedColumn(column_id.to_string()));
    }
    dataset
        .column(column_id)
        .ok_or_else(|| OperationError::ColumnNotFound(column_id.to_string()))
}

fn count_changed(before: &[Option<String>], after: &[Option<String>]) -> usize {
    before.iter().zip(after).filter(|(a, b)| a != b).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeduprError;
    use indexmap::IndexMap;

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Column::new("full_name", "Full Name", vec![Some("Albert Einstein".into()), None]),
                Column::new("email", "Email", vec![Some(" Ada@X.org".into()), Some("b@y.org".into())]),
            ],
            vec!["r1".into(), "r2".into()],
        )
        .unwrap()
    }

    fn classify(column_id: &str, classification: &str) -> Operation {
        Operation::ClassifyColumn {
            column_id: column_id.to_string(),
            classification: classification.to_string(),
        }
    }

    #[test]
    fn test_classify_in_place() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let (out, report) = engine.apply(&dataset(), &[classify("email", "person:email")]).unwrap();

        let email = out.column("email").unwrap();
        assert_eq!(email.classification, Some(ClassifierId::PersonEmail));
        assert_eq!(email.values[0].as_deref(), Some("ada@x.org"));
        assert_eq!(report.values_changed, 1);
        assert_eq!(report.operations_applied, 1);
    }

    #[test]
    fn test_classify_unknown_classifier() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let err = engine
            .apply(&dataset(), &[classify("email", "person:shoe_size")])
            .unwrap_err();
        assert!(matches!(
            err,
            DeduprError::Operation(OperationError::InvalidClassification(_))
        ));
    }

    #[test]
    fn test_batch_fails_fast_without_touching_input() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let input = dataset();
        let ops = vec![
            Operation::RemoveColumn {
                column_id: "email".to_string(),
            },
            Operation::RemoveColumn {
                column_id: "missing".to_string(),
            },
        ];

        let err = engine.apply(&input, &ops).unwrap_err();
        assert!(matches!(
            err,
            DeduprError::Operation(OperationError::ColumnNotFound(ref id)) if id == "missing"
        ));
        assert!(input.column("email").is_some());
    }

    #[test]
    fn test_row_id_is_reserved() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let err = engine
            .apply(&dataset(), &[classify(ROW_ID_COLUMN, "person:email")])
            .unwrap_err();
        assert!(matches!(
            err,
            DeduprError::Operation(OperationError::ReservedColumn(_))
        ));
    }

    #[test]
    fn test_add_column_length_checked() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let op = Operation::AddColumn {
            label: "Source".to_string(),
            values: vec![Some("crm".to_string())],
            classification: None,
        };
        assert!(engine.apply(&dataset(), &[op]).is_err());
    }

    #[test]
    fn test_update_skips_nulls_and_unmapped() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let mut updates = IndexMap::new();
        updates.insert("b@y.org".to_string(), "bee@y.org".to_string());
        updates.insert("unused".to_string(), "x".to_string());

        let (out, report) = engine
            .apply(
                &dataset(),
                &[Operation::UpdateColumnValues {
                    column_id: "email".to_string(),
                    updates,
                }],
            )
            .unwrap();

        let values = &out.column("email").unwrap().values;
        assert_eq!(values[0].as_deref(), Some(" Ada@X.org"));
        assert_eq!(values[1].as_deref(), Some("bee@y.org"));
        assert_eq!(report.values_changed, 1);
    }

    #[test]
    fn test_name_split_records_derived_changes() {
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let (out, report) = engine
            .apply(&dataset(), &[classify("full_name", "person:name")])
            .unwrap();

        assert!(out.column("full_name").is_none());
        assert_eq!(out.column_count(), 3);
        assert_eq!(report.operations_applied, 1);
        assert_eq!(report.columns_added, 2);
        assert_eq!(report.columns_removed, 1);
        assert_eq!(report.changes.len(), 3);
    }
}
