//! Fuzz target for classifier normalization.
//!
//! This fuzzer tests that every classifier transform:
//! 1. Never panics on any input
//! 2. Is idempotent
//! 3. Name parsing never panics on any input

#![no_main]

use dedupr::classifier::{parse_full_name, ClassifierId, ClassifierRegistry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let registry = ClassifierRegistry::new();

    for id in ClassifierId::ALL {
        let Some(bound) = registry.bind(id, "fuzz") else {
            continue;
        };
        let once = bound.transform(&input);
        assert_eq!(bound.transform(&once), once, "{} not idempotent", id);
    }

    let _ = parse_full_name(&input);
});
