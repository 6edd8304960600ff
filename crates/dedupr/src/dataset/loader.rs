//! CSV/TSV loading into the column model, with delimiter detection.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::classifier::DatasetType;
use crate::error::{DeduprError, Result};

use super::column::Column;
use super::ids::generate_unique_column_id;
use super::table::{Dataset, DatasetMetadata, ROW_ID_COLUMN};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Label given to columns with a blank header.
pub const UNNAMED_COLUMN_LABEL: &str = "(No name)";

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Dataset type recorded in the metadata.
    pub dataset_type: Option<DatasetType>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            dataset_type: None,
        }
    }
}

impl LoaderConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn with_dataset_type(mut self, dataset_type: DatasetType) -> Self {
        self.dataset_type = Some(dataset_type);
        self
    }
}

/// Reads delimited files into a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    config: LoaderConfig,
}

impl DatasetLoader {
    /// Create a loader with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a file, recording its name and content hash.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| DeduprError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        self.load_bytes(&contents, filename)
    }

    /// Load delimited bytes.
    pub fn load_bytes(&self, bytes: &[u8], original_filename: Option<String>) -> Result<Dataset> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        if !DELIMITERS.contains(&delimiter) {
            return Err(DeduprError::InvalidDelimiter(format!("{:?}", delimiter as char)));
        }

        let (headers, rows) = self.read_records(bytes, delimiter)?;
        let columns = build_columns(headers, rows);

        let metadata = DatasetMetadata {
            original_filename,
            dataset_type: self.config.dataset_type,
            created_at: Utc::now(),
            content_hash: Some(content_hash(bytes)),
        };
        let dataset = Dataset::with_generated_row_ids(columns)?.with_metadata(metadata);

        info!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            delimiter = %(delimiter as char).escape_default(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    fn read_records(&self, bytes: &[u8], delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() {
            return Err(DeduprError::EmptyData("No columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }

            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            row.resize(expected_cols, String::new());
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(DeduprError::EmptyData("No data rows found".to_string()));
        }

        Ok((headers, rows))
    }
}

/// Whether a raw cell counts as missing.
pub fn is_blank_cell(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "None"
}

fn build_columns(headers: Vec<String>, rows: Vec<Vec<String>>) -> Vec<Column> {
    let mut columns: Vec<Column> = headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            let label = match header.trim() {
                "" => UNNAMED_COLUMN_LABEL.to_string(),
                trimmed => trimmed.to_string(),
            };
            let values = rows
                .iter()
                .map(|row| {
                    let cell = &row[idx];
                    (!is_blank_cell(cell)).then(|| cell.clone())
                })
                .collect();
            Column::new(String::new(), label, values)
        })
        .collect();

    // Keep everything when no column has data.
    let has_data = |c: &Column| c.values.iter().any(Option::is_some);
    if columns.iter().any(has_data) {
        let before = columns.len();
        columns.retain(has_data);
        if columns.len() < before {
            debug!(dropped = before - columns.len(), "Dropped empty columns");
        }
    }

    let mut taken: Vec<String> = vec![ROW_ID_COLUMN.to_string()];
    for column in &mut columns {
        let id = generate_unique_column_id(&column.label, |id| taken.iter().any(|t| t == id));
        taken.push(id.clone());
        column.id = id;
    }
    columns
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(DeduprError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        let variance =
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64;

        // Consistent counts win; tabs break ties since they rarely occur in data.
        let score = if counts.iter().all(|&c| c == first_count) {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
