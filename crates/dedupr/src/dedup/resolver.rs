//! Reduces match clusters to a canonical/duplicate mapping.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::matcher::MatchCluster;

/// Duplicate row id → canonical row id.
///
/// Rows absent from the mapping are their own canonical record. Canonical
/// ids never appear as keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateMapping(BTreeMap<String, String>);

impl DuplicateMapping {
    /// Canonical record for a row.
    pub fn canonical<'a>(&'a self, row_id: &'a str) -> &'a str {
        self.0.get(row_id).map(String::as_str).unwrap_or(row_id)
    }

    /// Whether the row duplicates another.
    pub fn is_duplicate(&self, row_id: &str) -> bool {
        self.0.contains_key(row_id)
    }

    /// Number of duplicate rows.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// (duplicate, canonical) pairs in duplicate-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(d, c)| (d.as_str(), c.as_str()))
    }

    /// Distinct canonical ids that have at least one duplicate.
    pub fn canonical_ids(&self) -> BTreeSet<&str> {
        self.0.values().map(String::as_str).collect()
    }
}

/// Resolve clusters into a mapping.
///
/// Clusters sharing a row are merged first. In each merged group the
/// lexicographically smallest row id is canonical, so the result does not
/// depend on cluster or member order.
pub fn resolve(clusters: &[MatchCluster]) -> DuplicateMapping {
    let mut groups: Vec<BTreeSet<&str>> = Vec::new();

    for cluster in clusters {
        let mut merged: BTreeSet<&str> = cluster.row_ids.iter().map(String::as_str).collect();
        let mut idx = 0;
        while idx < groups.len() {
            if groups[idx].is_disjoint(&merged) {
                idx += 1;
            } else {
                merged.append(&mut groups.swap_remove(idx));
            }
        }
        groups.push(merged);
    }

    let mut mapping = BTreeMap::new();
    for group in groups {
        let mut ids = group.into_iter();
        let Some(canonical) = ids.next() else {
            continue;
        };
        for duplicate in ids {
            mapping.insert(duplicate.to_string(), canonical.to_string());
        }
    }
    DuplicateMapping(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_id_is_canonical() {
        let mapping = resolve(&[MatchCluster::new(["row2", "row1", "row3"])]);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.canonical("row2"), "row1");
        assert_eq!(mapping.canonical("row3"), "row1");
        assert_eq!(mapping.canonical("row1"), "row1");
        assert!(!mapping.is_duplicate("row1"));
    }

    #[test]
    fn test_singletons_and_empty_clusters() {
        let mapping = resolve(&[MatchCluster::new(["a"]), MatchCluster::new(Vec::<String>::new())]);
        assert!(mapping.is_empty());
        assert!(resolve(&[]).is_empty());
    }

    #[test]
    fn test_overlapping_clusters_merge() {
        let mapping = resolve(&[
            MatchCluster::new(["c", "d"]),
            MatchCluster::new(["e", "f"]),
            MatchCluster::new(["b", "c"]),
            MatchCluster::new(["f", "d"]),
        ]);
        for id in ["c", "d", "e", "f"] {
            assert_eq!(mapping.canonical(id), "b");
        }
        assert_eq!(mapping.canonical_ids(), BTreeSet::from(["b"]));
    }

    #[test]
    fn test_no_chains() {
        let mapping = resolve(&[MatchCluster::new(["b", "a"]), MatchCluster::new(["c", "b"])]);
        for (_, canonical) in mapping.iter() {
            assert!(!mapping.is_duplicate(canonical));
        }
    }
}
