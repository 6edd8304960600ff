//! Column-oriented dataset model.
//!
//! A [`Dataset`] is an ordered list of [`Column`]s whose values are aligned
//! by row index, plus stable row ids. Datasets are replaced, never mutated in
//! place, by the operation engine; deduplication reads them as snapshots.

mod column;
mod ids;
mod loader;
mod persistence;
mod table;

pub use column::{Column, ColumnDef, Row};
pub use ids::{generate_column_id, generate_row_id, generate_unique_column_id};
pub use loader::{DatasetLoader, LoaderConfig, UNNAMED_COLUMN_LABEL, is_blank_cell};
pub use table::{Dataset, DatasetMetadata, ROW_ID_COLUMN, ROW_ID_LABEL};
