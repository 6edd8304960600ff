//! Column operations, their wire form, and the audit of applying them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierId;
use crate::error::OperationError;

/// A structural or value edit to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Operation {
    /// Drop a column.
    RemoveColumn { column_id: String },

    /// Append a column under a freshly generated id.
    AddColumn {
        label: String,
        values: Vec<Option<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        classification: Option<ClassifierId>,
    },

    /// Classify a column and normalize its values, or apply the classifier's
    /// derived edits instead.
    ClassifyColumn {
        column_id: String,
        classification: String,
    },

    /// Replace values that exactly match a mapping key.
    UpdateColumnValues {
        column_id: String,
        updates: IndexMap<String, String>,
    },
}

impl Operation {
    /// Wire name of the action.
    pub fn action(&self) -> &'static str {
        match self {
            Operation::RemoveColumn { .. } => "remove_column",
            Operation::AddColumn { .. } => "add_column",
            Operation::ClassifyColumn { .. } => "classify_column",
            Operation::UpdateColumnValues { .. } => "update_column_values",
        }
    }

    /// Column the operation targets, if it targets an existing one.
    pub fn column_id(&self) -> Option<&str> {
        match self {
            Operation::RemoveColumn { column_id }
            | Operation::ClassifyColumn { column_id, .. }
            | Operation::UpdateColumnValues { column_id, .. } => Some(column_id),
            Operation::AddColumn { .. } => None,
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            Operation::RemoveColumn { column_id } => format!("Remove column '{}'", column_id),
            Operation::AddColumn {
                label,
                classification,
                ..
            } => match classification {
                Some(c) => format!("Add column '{}' classified as {}", label, c),
                None => format!("Add column '{}'", label),
            },
            Operation::ClassifyColumn {
                column_id,
                classification,
            } => format!("Classify '{}' as {}", column_id, classification),
            Operation::UpdateColumnValues { column_id, updates } => {
                let examples: Vec<String> = updates
                    .iter()
                    .take(3)
                    .map(|(from, to)| format!("'{}' → '{}'", from, to))
                    .collect();
                format!("Update '{}': {}", column_id, examples.join(", "))
            }
        }
    }
}

/// Loosely typed operation as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Option<String>>>,
}

impl OperationRequest {
    /// Validate the request shape and convert it to an [`Operation`].
    pub fn into_operation(self) -> Result<Operation, OperationError> {
        let action = self.action;
        let require = |value: Option<String>, field: &'static str| {
            value.ok_or_else(|| OperationError::MissingField {
                action: action.clone(),
                field,
            })
        };

        match action.as_str() {
            "remove_column" => Ok(Operation::RemoveColumn {
                column_id: require(self.column_id, "column_id")?,
            }),
            "add_column" => {
                let classification = self
                    .classification
                    .map(|c| {
                        c.parse::<ClassifierId>()
                            .map_err(|_| OperationError::InvalidClassification(c))
                    })
                    .transpose()?;
                Ok(Operation::AddColumn {
                    label: require(self.label, "label")?,
                    values: self.values.ok_or_else(|| OperationError::MissingField {
                        action: action.clone(),
                        field: "values",
                    })?,
                    classification,
                })
            }
            "classify_column" => Ok(Operation::ClassifyColumn {
                column_id: require(self.column_id, "column_id")?,
                classification: require(self.classification, "classification")?,
            }),
            "update_column_values" => Ok(Operation::UpdateColumnValues {
                column_id: require(self.column_id, "column_id")?,
                updates: self.updates.ok_or_else(|| OperationError::MissingField {
                    action: action.clone(),
                    field: "updates",
                })?,
            }),
            _ => Err(OperationError::InvalidAction(action.clone())),
        }
    }
}

impl From<Operation> for OperationRequest {
    fn from(operation: Operation) -> Self {
        let action = operation.action().to_string();
        match operation {
            Operation::RemoveColumn { column_id } => Self {
                action,
                column_id: Some(column_id),
                ..Default::default()
            },
            Operation::AddColumn {
                label,
                values,
                classification,
            } => Self {
                action,
                label: Some(label),
                values: Some(values),
                classification: classification.map(|c| c.to_string()),
                ..Default::default()
            },
            Operation::ClassifyColumn {
                column_id,
                classification,
            } => Self {
                action,
                column_id: Some(column_id),
                classification: Some(classification),
                ..Default::default()
            },
            Operation::UpdateColumnValues { column_id, updates } => Self {
                action,
                column_id: Some(column_id),
                updates: Some(updates),
                ..Default::default()
            },
        }
    }
}

/// Result of applying an operation batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Number of requested operations applied.
    pub operations_applied: usize,

    /// Number of cell values changed.
    pub values_changed: usize,

    /// Number of columns added.
    pub columns_added: usize,

    /// Number of columns removed.
    pub columns_removed: usize,

    /// Detailed changes, including those of derived operations.
    pub changes: Vec<OperationChange>,
}

/// A single change made while applying operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationChange {
    /// Description of the change.
    pub description: String,

    /// Column affected.
    pub column_id: String,

    /// Number of values changed.
    pub values_changed: usize,
}

impl ApplyReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a change to the report.
    pub fn add_change(&mut self, change: OperationChange) {
        self.values_changed += change.values_changed;
        self.changes.push(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(action: &str) -> OperationRequest {
        OperationRequest {
            action: action.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_action() {
        assert_eq!(
            request("rename_column").into_operation(),
            Err(OperationError::InvalidAction("rename_column".to_string()))
        );
    }

    #[test]
    fn test_missing_fields() {
        assert_eq!(
            request("remove_column").into_operation(),
            Err(OperationError::MissingField {
                action: "remove_column".to_string(),
                field: "column_id"
            })
        );

        let mut update = request("update_column_values");
        update.column_id = Some("phone".to_string());
        assert!(matches!(
            update.into_operation(),
            Err(OperationError::MissingField { field: "updates", .. })
        ));
    }

    #[test]
    fn test_parse_batch_from_json() {
        let json = r#"[
            {"action": "classify_column", "column_id": "email_abcd", "classification": "person:email"},
            {"action": "update_column_values", "column_id": "phone_efgh", "updates": {"555-1234": "+15551234567"}},
            {"action": "add_column", "label": "Source", "values": ["crm", null]}
        ]"#;
        let requests: Vec<OperationRequest> = serde_json::from_str(json).unwrap();
        let ops: Vec<Operation> = requests
            .into_iter()
            .map(OperationRequest::into_operation)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(ops[0].action(), "classify_column");
        assert_eq!(ops[1].column_id(), Some("phone_efgh"));
        assert_eq!(
            ops[2],
            Operation::AddColumn {
                label: "Source".to_string(),
                values: vec![Some("crm".to_string()), None],
                classification: None,
            }
        );
    }

    #[test]
    fn test_add_column_with_unknown_classification() {
        let mut add = request("add_column");
        add.label = Some("X".to_string());
        add.values = Some(vec![]);
        add.classification = Some("person:shoe_size".to_string());
        assert_eq!(
            add.into_operation(),
            Err(OperationError::InvalidClassification("person:shoe_size".to_string()))
        );
    }

    #[test]
    fn test_request_from_operation() {
        let op = Operation::ClassifyColumn {
            column_id: "a".to_string(),
            classification: "person:email".to_string(),
        };
        let back = OperationRequest::from(op.clone()).into_operation().unwrap();
        assert_eq!(back, op);
    }
}
