//! Match specifications handed to a record matcher.

use serde::Serialize;

use crate::classifier::{ComparatorSpec, DatasetType};

use super::rules::{PairPredicate, Tier};

/// A blocking predicate bound to concrete column ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundPredicate {
    /// All listed columns equal.
    Exact { column_ids: Vec<String> },
    /// A symbolic predicate over two columns.
    Pair {
        left: String,
        right: String,
        predicate: PairPredicate,
    },
}

impl BoundPredicate {
    /// Columns the predicate reads.
    pub fn column_ids(&self) -> Vec<&str> {
        match self {
            BoundPredicate::Exact { column_ids } => column_ids.iter().map(String::as_str).collect(),
            BoundPredicate::Pair { left, right, .. } => vec![left.as_str(), right.as_str()],
        }
    }

    /// Render as a symbolic expression over a left (`l`) and right (`r`) record.
    pub fn render(&self) -> String {
        match self {
            BoundPredicate::Exact { column_ids } => column_ids
                .iter()
                .map(|c| format!("l.{c} = r.{c}"))
                .collect::<Vec<_>>()
                .join(" AND "),
            BoundPredicate::Pair {
                left,
                right,
                predicate: PairPredicate::FuzzyLeftExactRight { max_edits },
            } => format!(
                "levenshtein(l.{left}, r.{left}) <= {max_edits} AND l.{right} = r.{right}"
            ),
            BoundPredicate::Pair {
                left,
                right,
                predicate: PairPredicate::PrefixLeftExactRight { len },
            } => format!(
                "substr(l.{left}, 1, {len}) = substr(r.{left}, 1, {len}) AND l.{right} = r.{right}"
            ),
        }
    }
}

/// A blocking rule bound to the dataset's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundBlockingRule {
    /// Name of the rule in its table.
    pub name: &'static str,
    /// Tier the rule belongs to.
    pub tier: Tier,
    pub predicate: BoundPredicate,
}

/// Everything a record matcher needs to find duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSpec {
    pub dataset_type: DatasetType,
    pub tier: Tier,
    /// Blocking rules in table order.
    pub blocking_rules: Vec<BoundBlockingRule>,
    /// Comparators to fit, in column order. Empty for the deterministic tier.
    pub comparators: Vec<ComparatorSpec>,
    /// Pairs scoring at or above this probability are linked.
    pub match_threshold: f64,
}

impl MatchSpec {
    /// Symbolic form of every blocking predicate, in rule order.
    pub fn render_predicates(&self) -> Vec<String> {
        self.blocking_rules
            .iter()
            .map(|rule| rule.predicate.render())
            .collect()
    }

    /// Names of the blocking rules, in rule order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.blocking_rules.iter().map(|rule| rule.name).collect()
    }

    /// Every column the spec reads, deduplicated, in first-use order.
    pub fn column_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        let blocking = self.blocking_rules.iter().flat_map(|r| r.predicate.column_ids());
        let compared = self.comparators.iter().map(|c| c.column_id.as_str());
        for id in blocking.chain(compared) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}
