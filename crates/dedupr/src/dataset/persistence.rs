//! Persistence for dataset snapshots - save/load JSON files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::error::{DeduprError, Result};

use super::table::Dataset;

impl Dataset {
    /// Save the dataset snapshot to a JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use dedupr::dataset::Dataset;
    /// # fn example(dataset: &Dataset) -> dedupr::Result<()> {
    /// dataset.save("people.dataset.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    DeduprError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            DeduprError::Persistence(format!(
                "Failed to create file '{}': {}",
                path.display(),
                e
            ))
        })?;

        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            DeduprError::Persistence(format!("Failed to serialize dataset: {}", e))
        })?;

        Ok(())
    }

    /// Load a dataset snapshot from a JSON file.
    ///
    /// Column alignment is re-checked, so a hand-edited snapshot cannot
    /// produce a ragged dataset.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            DeduprError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let raw: Dataset = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            DeduprError::Persistence(format!(
                "Failed to parse dataset '{}': {}",
                path.display(),
                e
            ))
        })?;

        raw.validated()
    }

    fn validated(self) -> Result<Self> {
        let Dataset {
            metadata,
            columns,
            row_ids,
            retired_column_ids,
        } = self;
        let mut dataset = Dataset::new(columns, row_ids)?.with_metadata(metadata);
        dataset.retired_column_ids = retired_column_ids;
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("snapshot.json");

        let mut dataset = Dataset::new(
            vec![
                Column::new("email", "Email", vec![Some("a@x.org".into()), None]),
                Column::new("old", "Old", vec![None, None]),
            ],
            vec!["r1".into(), "r2".into()],
        )
        .unwrap();
        dataset.remove_column("old").unwrap();

        dataset.save(&path).unwrap();
        let loaded = Dataset::load(&path).unwrap();

        assert_eq!(loaded, dataset);
        assert!(loaded.is_column_id_taken("old"));
    }

    #[test]
    fn test_load_rejects_ragged_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(
            &path,
            r#"{"metadata":{"created_at":"2024-01-01T00:00:00Z"},
                "columns":[{"id":"a","label":"A","data":["x"]}],
                "row_ids":["r1","r2"]}"#,
        )
        .unwrap();

        assert!(Dataset::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_duplicate_row_ids() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dup.json");
        fs::write(
            &path,
            r#"{"metadata":{"created_at":"2024-01-01T00:00:00Z"},
                "columns":[{"id":"a","label":"A","data":["x","y"]}],
                "row_ids":["r1","r1"]}"#,
        )
        .unwrap();

        let err = Dataset::load(&path).unwrap_err();
        assert!(matches!(err, DeduprError::Persistence(msg) if msg.contains("r1")));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load("/nonexistent/snapshot.json").unwrap_err();
        assert!(matches!(err, DeduprError::Persistence(_)));
    }
}
