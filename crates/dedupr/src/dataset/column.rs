//! Column and row types of the column-oriented dataset model.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierId;

/// A single column: metadata plus row-aligned values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Identifier, unique within the dataset.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Semantic classification, once assigned.
    #[serde(default)]
    pub classification: Option<ClassifierId>,
    /// Values aligned by row index; `None` is a missing value.
    #[serde(rename = "data")]
    pub values: Vec<Option<String>>,
}

impl Column {
    /// Create an unclassified column.
    pub fn new(id: impl Into<String>, label: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            classification: None,
            values,
        }
    }

    /// Set the classification.
    pub fn with_classification(mut self, classification: ClassifierId) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Value-less definition of this column.
    pub fn def(&self) -> ColumnDef {
        ColumnDef {
            id: self.id.clone(),
            label: self.label.clone(),
            classification: self.classification,
        }
    }

    /// First `limit` non-blank values, used as samples for suggestions.
    pub fn sample(&self, limit: usize) -> Vec<&str> {
        self.values
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
            .take(limit)
            .collect()
    }
}

/// A column definition without values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub classification: Option<ClassifierId>,
}

/// Row view over a dataset, keyed by column id in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Stable row identity.
    pub id: String,
    /// Cell values by column id.
    #[serde(rename = "data")]
    pub values: IndexMap<String, Option<String>>,
}

impl Row {
    /// Value of a column, treating missing cells and nulls alike.
    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.values.get(column_id).and_then(|v| v.as_deref())
    }
}
