//! Property-based tests for dedupr.
//!
//! These tests use proptest to generate random inputs and verify that
//! transforms, operations, planning and resolution keep their invariants.
//!
//! # Testing Philosophy
//!
//! Property-based tests verify:
//! 1. **No panics**: Transforms never crash on any input
//! 2. **Determinism**: Same input always produces same output
//! 3. **Idempotence**: Re-applying a normalization changes nothing
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p dedupr --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p dedupr --test property_tests
//! ```

use indexmap::IndexMap;
use proptest::prelude::*;

use dedupr::classifier::{ClassifierId, ClassifierRegistry, DatasetType};
use dedupr::dataset::{Column, ColumnDef, Dataset};
use dedupr::dedup::{DeduplicationPlanner, MatchCluster, resolve};
use dedupr::operations::{ColumnEngine, Operation};

// =============================================================================
// Test Strategies
// =============================================================================

/// Arbitrary text, including unicode and control characters.
fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "\\PC{0,40}",
        ".{0,40}",
        "[a-zA-Z0-9@._+\\-/: ]{0,40}",
    ]
}

/// Strings shaped like the values each classifier sees.
fn realistic_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z]{1,10} [A-Za-z]{1,12}",
        "[a-z]{1,8}@[a-z]{1,8}\\.(com|org|io)",
        "\\+?[0-9 ()\\-]{5,16}",
        "(https?://)?(www\\.)?[a-z]{2,10}\\.(com|net)(/[a-z]{0,6})?/?",
        "@?[A-Za-z0-9_]{1,15}",
        "[A-Za-z ]{1,20} (Inc|LLC|Ltd|GmbH)\\.?",
    ]
}

fn row_id() -> impl Strategy<Value = String> {
    "r[0-9]{1,2}"
}

fn clusters() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(row_id(), 1..5), 0..8)
}

fn classifier_id() -> impl Strategy<Value = ClassifierId> {
    prop::sample::select(ClassifierId::ALL.to_vec())
}

// =============================================================================
// Classifier transforms
// =============================================================================

proptest! {
    #[test]
    fn prop_transforms_are_idempotent(value in prop_oneof![any_text(), realistic_value()]) {
        let registry = ClassifierRegistry::new();
        for id in ClassifierId::ALL {
            let bound = registry.bind(id, "col").unwrap();
            let once = bound.transform(&value);
            let twice = bound.transform(&once);
            prop_assert_eq!(&once, &twice, "{} not idempotent on {:?}", id, value);
        }
    }

    #[test]
    fn prop_transform_values_keeps_nulls_and_length(
        values in prop::collection::vec(prop::option::of(any_text()), 0..20),
        id in classifier_id(),
    ) {
        let registry = ClassifierRegistry::new();
        let bound = registry.bind(id, "col").unwrap();
        let out = bound.transform_values(&values);

        prop_assert_eq!(out.len(), values.len());
        for (before, after) in values.iter().zip(&out) {
            prop_assert_eq!(before.is_none(), after.is_none());
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

proptest! {
    #[test]
    fn prop_update_values_is_idempotent(
        values in prop::collection::vec(prop::option::of("[a-c]{1,2}"), 1..20),
        mapping in prop::collection::vec(("[a-c]{1,2}", "[x-z]{1,2}"), 0..6),
    ) {
        let updates: IndexMap<String, String> = mapping.into_iter().collect();
        let dataset = Dataset::with_generated_row_ids(vec![Column::new("v", "V", values.clone())]).unwrap();
        let registry = ClassifierRegistry::new();
        let engine = ColumnEngine::new(&registry);
        let op = Operation::UpdateColumnValues { column_id: "v".into(), updates: updates.clone() };

        let (once, _) = engine.apply(&dataset, std::slice::from_ref(&op)).unwrap();
        let (twice, report) = engine.apply(&once, &[op]).unwrap();

        let once_values = &once.column("v").unwrap().values;
        prop_assert_eq!(once_values, &twice.column("v").unwrap().values);
        prop_assert_eq!(report.values_changed, 0);

        for (before, after) in values.iter().zip(once_values) {
            match before {
                Some(v) => match updates.get(v) {
                    Some(target) => prop_assert_eq!(after.as_deref(), Some(target.as_str())),
                    None => prop_assert_eq!(after, before),
                },
                None => prop_assert!(after.is_none()),
            }
        }
    }

    #[test]
    fn prop_name_split_preserves_rows(
        names in prop::collection::vec(prop::option::of(any_text()), 1..15),
    ) {
        let rows = names.len();
        let dataset = Dataset::with_generated_row_ids(vec![Column::new("n", "Name", names)]).unwrap();
        let registry = ClassifierRegistry::new();
        let (out, _) = ColumnEngine::new(&registry)
            .apply(&dataset, &[Operation::ClassifyColumn {
                column_id: "n".into(),
                classification: "person:name".into(),
            }])
            .unwrap();

        prop_assert!(out.column("n").is_none());
        prop_assert_eq!(out.column_count(), 2);
        prop_assert_eq!(out.row_ids(), dataset.row_ids());
        for column in out.columns() {
            prop_assert_eq!(column.values.len(), rows);
        }
    }
}

// =============================================================================
// Planning and resolution
// =============================================================================

proptest! {
    #[test]
    fn prop_planning_is_deterministic(
        ids in prop::collection::vec(classifier_id(), 0..6),
        person in any::<bool>(),
    ) {
        let dataset_type = if person { DatasetType::Person } else { DatasetType::Company };
        let columns: Vec<ColumnDef> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| ColumnDef {
                id: format!("c{}", i),
                label: format!("C{}", i),
                classification: Some(*id),
            })
            .collect();
        let selected: Vec<String> = columns.iter().map(|c| c.id.clone()).collect();

        let registry = ClassifierRegistry::new();
        let planner = DeduplicationPlanner::new(&registry);
        let first = planner.plan(&columns, &selected, dataset_type);
        let second = planner.plan(&columns, &selected, dataset_type);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_resolution_is_order_independent(raw in clusters()) {
        let forward: Vec<MatchCluster> = raw.iter().map(|c| MatchCluster::new(c.clone())).collect();
        let backward: Vec<MatchCluster> = raw
            .iter()
            .rev()
            .map(|c| MatchCluster::new(c.iter().rev().cloned()))
            .collect();

        prop_assert_eq!(resolve(&forward), resolve(&backward));
    }

    #[test]
    fn prop_canonical_is_minimal_and_final(raw in clusters()) {
        let clusters: Vec<MatchCluster> = raw.iter().map(|c| MatchCluster::new(c.clone())).collect();
        let mapping = resolve(&clusters);

        for cluster in &raw {
            let min = cluster.iter().min().unwrap();
            for row in cluster {
                let canonical = mapping.canonical(row);
                prop_assert!(canonical <= min.as_str());
                // Canonicals are never themselves duplicates
                prop_assert!(!mapping.is_duplicate(canonical));
            }
        }
    }
}
