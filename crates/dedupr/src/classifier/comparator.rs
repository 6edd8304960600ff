//! Comparator specifications handed to the record matcher.

use serde::{Deserialize, Serialize};

/// How two values of a classified column should be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparatorKind {
    /// Fuzzy personal or organization name comparison
    /// (exact, then Jaro-Winkler / edit-distance levels).
    Name,
    /// Email comparison with a separate level for matching usernames.
    Email,
    /// Exact match weighted by how common the value is.
    ExactTermFrequency,
    /// Compare web addresses by full value, then by registered domain.
    Url,
    /// Plain exact match.
    Exact,
}

impl ComparatorKind {
    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            ComparatorKind::Name => "fuzzy name comparison",
            ComparatorKind::Email => "email comparison",
            ComparatorKind::ExactTermFrequency => "exact match with frequency weighting",
            ComparatorKind::Url => "url comparison by address and domain",
            ComparatorKind::Exact => "exact match",
        }
    }

    /// Whether matching values should be weighted by their frequency.
    pub fn term_frequency_adjustments(&self) -> bool {
        matches!(self, ComparatorKind::ExactTermFrequency)
    }
}

/// A comparator bound to a concrete column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparatorSpec {
    /// Column the comparator reads.
    pub column_id: String,
    /// Comparison strategy.
    pub kind: ComparatorKind,
    /// Weight agreements by value frequency.
    pub term_frequency_adjustments: bool,
}

impl ComparatorSpec {
    /// Bind a comparator kind to a column.
    pub fn new(column_id: impl Into<String>, kind: ComparatorKind) -> Self {
        Self {
            column_id: column_id.into(),
            kind,
            term_frequency_adjustments: kind.term_frequency_adjustments(),
        }
    }
}
