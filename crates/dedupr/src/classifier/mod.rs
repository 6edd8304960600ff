//! Semantic column classifiers.
//!
//! A classifier recognizes what a column holds (a person's email, a company
//! website, ...) and knows how to normalize its values. Classifiers are plain
//! records pointing at a shared value strategy; the [`ClassifierRegistry`]
//! is built once and passed by reference to the operation engine and the
//! deduplication planner.
//!
//! # Example
//!
//! ```
//! use dedupr::classifier::ClassifierRegistry;
//!
//! let registry = ClassifierRegistry::new();
//! let email = registry.lookup("person:email", "email_col").unwrap();
//! assert_eq!(email.transform("  Ada@Example.COM "), "ada@example.com");
//! ```

mod comparator;
mod id;
mod name;
mod registry;
pub mod transforms;

pub use comparator::{ComparatorKind, ComparatorSpec};
pub use id::{ClassifierId, DatasetType};
pub use name::{ParsedName, parse_full_name};
pub use registry::{
    BoundClassifier, Classification, Classifier, ClassifierRegistry, RegistryConfig, ValueKind,
};
