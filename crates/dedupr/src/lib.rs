//! Dedupr: classify, clean and deduplicate tabular contact data.
//!
//! A dataset of people or companies is loaded into a column-oriented model.
//! Columns are classified (an email, a phone number, a full name, ...), and a
//! classification normalizes the column's values. Classified columns then
//! drive deduplication: a planner picks blocking rules and comparators, an
//! external matcher clusters records, and a resolver reduces clusters to a
//! canonical-row mapping.
//!
//! # Core Principles
//!
//! - **Replace, don't mutate**: operations produce a new dataset
//! - **Closed classifier set**: every classification is a known [`ClassifierId`]
//! - **Untrusted suggestions**: provider output is validated before use
//!
//! # Example
//!
//! ```
//! use dedupr::classifier::ClassifierRegistry;
//! use dedupr::dataset::{Column, Dataset};
//! use dedupr::operations::{ColumnEngine, Operation};
//!
//! let dataset = Dataset::with_generated_row_ids(vec![Column::new(
//!     "email_abcd",
//!     "Email",
//!     vec![Some(" Ada@Example.COM ".to_string()), None],
//! )])
//! .unwrap();
//!
//! let registry = ClassifierRegistry::new();
//! let engine = ColumnEngine::new(&registry);
//! let (updated, report) = engine
//!     .apply(
//!         &dataset,
//!         &[Operation::ClassifyColumn {
//!             column_id: "email_abcd".to_string(),
//!             classification: "person:email".to_string(),
//!         }],
//!     )
//!     .unwrap();
//!
//! assert_eq!(report.values_changed, 1);
//! assert_eq!(
//!     updated.column("email_abcd").unwrap().values[0].as_deref(),
//!     Some("ada@example.com")
//! );
//! ```

pub mod classifier;
pub mod dataset;
pub mod dedup;
pub mod error;
pub mod operations;
pub mod suggestion;

pub use classifier::{ClassifierId, ClassifierRegistry, DatasetType};
pub use dataset::{Column, Dataset, DatasetLoader};
pub use dedup::{DeduplicationRequest, DeduplicationResponse, Deduplicator};
pub use error::{DeduprError, MatcherError, OperationError, PlanningFailure, Result};
pub use operations::{ApplyReport, ColumnEngine, Operation};
