//! Fuzz target for DatasetLoader.
//!
//! This fuzzer tests that loading:
//! 1. Never panics on any input
//! 2. Always yields aligned columns and unique ids when it succeeds

#![no_main]

use std::collections::HashSet;

use dedupr::DatasetLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let Ok(dataset) = DatasetLoader::new().load_bytes(data, None) else {
        return;
    };

    let rows = dataset.row_count();
    let mut ids = HashSet::new();
    for column in dataset.columns() {
        assert_eq!(column.values.len(), rows);
        assert!(ids.insert(column.id.clone()), "duplicate column id {}", column.id);
    }

    // Flat records must round-trip
    let restored = dedupr::Dataset::from_records(dataset.to_records()).expect("records round-trip");
    assert_eq!(restored.row_ids(), dataset.row_ids());
});
