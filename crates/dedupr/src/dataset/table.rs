//! The column-oriented dataset.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::DatasetType;
use crate::error::{DeduprError, OperationError, Result};

use super::column::{Column, ColumnDef, Row};
use super::ids::generate_row_id;

/// Id of the reserved row identity column in the flat record format.
pub const ROW_ID_COLUMN: &str = "row_id";

/// Label of the reserved row identity column.
pub const ROW_ID_LABEL: &str = "Row ID";

/// Metadata about a dataset snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Name of the uploaded file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    /// Domain of the records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_type: Option<DatasetType>,
    /// When the dataset was ingested.
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the source file contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Default for DatasetMetadata {
    fn default() -> Self {
        Self {
            original_filename: None,
            dataset_type: None,
            created_at: Utc::now(),
            content_hash: None,
        }
    }
}

/// An ordered set of equal-length columns plus stable row ids.
///
/// Row ids are kept apart from the data columns; they travel as the reserved
/// `row_id` column only in the flat record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    pub(super) columns: Vec<Column>,
    pub(super) row_ids: Vec<String>,
    /// Ids of removed columns; generated ids never reuse them.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub(super) retired_column_ids: BTreeSet<String>,
}

impl Dataset {
    /// Create a dataset, checking that every column is aligned with the rows.
    pub fn new(columns: Vec<Column>, row_ids: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.id == ROW_ID_COLUMN {
                return Err(OperationError::ReservedColumn(column.id.clone()).into());
            }
            if !seen.insert(column.id.as_str()) {
                return Err(DeduprError::Persistence(format!(
                    "Duplicate column id '{}'",
                    column.id
                )));
            }
            if column.values.len() != row_ids.len() {
                return Err(OperationError::LengthMismatch {
                    column: column.id.clone(),
                    expected: row_ids.len(),
                    actual: column.values.len(),
                }
                .into());
            }
        }

        let mut seen_rows = HashSet::new();
        for row_id in &row_ids {
            if !seen_rows.insert(row_id.as_str()) {
                return Err(DeduprError::Persistence(format!("Duplicate row id '{}'", row_id)));
            }
        }

        Ok(Self {
            metadata: DatasetMetadata::default(),
            columns,
            row_ids,
            retired_column_ids: BTreeSet::new(),
        })
    }

    /// Create a dataset with freshly generated row ids.
    pub fn with_generated_row_ids(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.values.len()).unwrap_or(0);
        let row_ids = (0..row_count).map(|_| generate_row_id()).collect();
        Self::new(columns, row_ids)
    }

    /// Set the metadata.
    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the dataset type.
    ///
    /// The type scopes which classifiers apply, so it is locked once any
    /// column carries a classification.
    pub fn set_dataset_type(&mut self, dataset_type: DatasetType) -> Result<()> {
        if self.metadata.dataset_type != Some(dataset_type)
            && self.columns.iter().any(|c| c.classification.is_some())
        {
            return Err(DeduprError::DatasetTypeLocked);
        }
        self.metadata.dataset_type = Some(dataset_type);
        Ok(())
    }

    /// Dataset type, if set.
    pub fn dataset_type(&self) -> Option<DatasetType> {
        self.metadata.dataset_type
    }

    /// Columns in display order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row ids in row order.
    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    /// Number of data columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.row_ids.len()
    }

    /// Get a column by id.
    pub fn column(&self, id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    /// Position of a column.
    pub fn column_index(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Value-less column definitions, in display order.
    pub fn column_defs(&self) -> Vec<ColumnDef> {
        self.columns.iter().map(Column::def).collect()
    }

    /// Row view of the data.
    pub fn rows(&self) -> Vec<Row> {
        self.row_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| Row {
                id: id.clone(),
                values: self
                    .columns
                    .iter()
                    .map(|c| (c.id.clone(), c.values[idx].clone()))
                    .collect(),
            })
            .collect()
    }

    /// Whether an id is used by a current or removed column.
    pub fn is_column_id_taken(&self, id: &str) -> bool {
        id == ROW_ID_COLUMN
            || self.retired_column_ids.contains(id)
            || self.columns.iter().any(|c| c.id == id)
    }

    pub(crate) fn column_mut(&mut self, id: &str) -> std::result::Result<&mut Column, OperationError> {
        if id == ROW_ID_COLUMN {
            return Err(OperationError::ReservedColumn(id.to_string()));
        }
        self.columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| OperationError::ColumnNotFound(id.to_string()))
    }

    pub(crate) fn remove_column(&mut self, id: &str) -> std::result::Result<Column, OperationError> {
        if id == ROW_ID_COLUMN {
            return Err(OperationError::ReservedColumn(id.to_string()));
        }
        let idx = self
            .column_index(id)
            .ok_or_else(|| OperationError::ColumnNotFound(id.to_string()))?;
        let column = self.columns.remove(idx);
        self.retired_column_ids.insert(column.id.clone());
        Ok(column)
    }

    pub(crate) fn push_column(&mut self, column: Column) -> std::result::Result<(), OperationError> {
        if column.values.len() != self.row_count() {
            return Err(OperationError::LengthMismatch {
                column: column.id,
                expected: self.row_count(),
                actual: column.values.len(),
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Flatten into column records with the reserved `row_id` column last.
    pub fn to_records(&self) -> Vec<Column> {
        let mut records = self.columns.clone();
        records.push(Column::new(
            ROW_ID_COLUMN,
            ROW_ID_LABEL,
            self.row_ids.iter().cloned().map(Some).collect(),
        ));
        records
    }

    /// Rebuild a dataset from column records containing a `row_id` column.
    pub fn from_records(mut records: Vec<Column>) -> Result<Self> {
        let idx = records
            .iter()
            .position(|c| c.id == ROW_ID_COLUMN)
            .ok_or_else(|| DeduprError::Persistence("Row ID column not found".to_string()))?;
        let row_column = records.remove(idx);

        let row_ids = row_column
            .values
            .into_iter()
            .enumerate()
            .map(|(row, id)| {
                id.filter(|id| !id.is_empty()).ok_or_else(|| {
                    DeduprError::Persistence(format!("Row {} has no row id", row))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(records, row_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierId;

    fn sample_dataset() -> Dataset {
        Dataset::new(
            vec![
                Column::new("name", "Name", vec![Some("Ada".into()), None]),
                Column::new("email", "Email", vec![Some("ada@x.org".into()), Some("b@y.org".into())]),
            ],
            vec!["r1".into(), "r2".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_misaligned_columns() {
        let err = Dataset::new(
            vec![Column::new("a", "A", vec![Some("x".into())])],
            vec!["r1".into(), "r2".into()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DeduprError::Operation(OperationError::LengthMismatch { expected: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_reserved_and_duplicate_ids() {
        let reserved = Dataset::new(vec![Column::new("row_id", "Row", vec![])], vec![]);
        assert!(reserved.is_err());

        let duplicate = Dataset::new(
            vec![Column::new("a", "A", vec![]), Column::new("a", "B", vec![])],
            vec![],
        );
        assert!(duplicate.is_err());

        let duplicate_rows = Dataset::new(
            vec![Column::new("a", "A", vec![Some("x".into()), Some("y".into())])],
            vec!["r1".into(), "r1".into()],
        );
        assert!(matches!(duplicate_rows, Err(DeduprError::Persistence(_))));
    }

    #[test]
    fn test_rows_view() {
        let rows = sample_dataset().rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "r1");
        assert_eq!(rows[0].get("name"), Some("Ada"));
        assert_eq!(rows[1].get("name"), None);
        assert_eq!(rows[1].values.keys().collect::<Vec<_>>(), vec!["name", "email"]);
    }

    #[test]
    fn test_records_round_trip() {
        let dataset = sample_dataset();
        let records = dataset.to_records();
        assert_eq!(records.last().unwrap().id, ROW_ID_COLUMN);

        let rebuilt = Dataset::from_records(records).unwrap();
        assert_eq!(rebuilt.row_ids(), dataset.row_ids());
        assert_eq!(rebuilt.columns(), dataset.columns());
    }

    #[test]
    fn test_from_records_requires_row_id() {
        let err = Dataset::from_records(vec![Column::new("a", "A", vec![])]).unwrap_err();
        assert!(matches!(err, DeduprError::Persistence(_)));
    }

    #[test]
    fn test_dataset_type_locked_after_classification() {
        let mut dataset = sample_dataset();
        dataset.set_dataset_type(DatasetType::Person).unwrap();
        dataset.set_dataset_type(DatasetType::Company).unwrap();

        dataset.column_mut("email").unwrap().classification = Some(ClassifierId::CompanyEmail);
        assert!(matches!(
            dataset.set_dataset_type(DatasetType::Person),
            Err(DeduprError::DatasetTypeLocked)
        ));
        assert!(dataset.set_dataset_type(DatasetType::Company).is_ok());
    }

    #[test]
    fn test_removed_ids_stay_taken() {
        let mut dataset = sample_dataset();
        dataset.remove_column("name").unwrap();
        assert!(dataset.column("name").is_none());
        assert!(dataset.is_column_id_taken("name"));
        assert!(dataset.is_column_id_taken(ROW_ID_COLUMN));
        assert!(matches!(
            dataset.remove_column("name"),
            Err(OperationError::ColumnNotFound(_))
        ));
    }
}
