//! Static blocking-rule tables, one per dataset type.
//!
//! Tables are ordered most selective first. Order decides which rule a
//! matcher applies first; it does not rank matches.

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifierId, DatasetType};

/// Matching tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Rows match when a rule's predicate holds.
    Deterministic,
    /// Rule predicates only limit candidate pairs; comparators score them.
    Probabilistic,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Deterministic => f.write_str("deterministic"),
            Tier::Probabilistic => f.write_str("probabilistic"),
        }
    }
}

/// Predicate over two classified columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairPredicate {
    /// Left values within `max_edits` edits of each other, right values equal.
    FuzzyLeftExactRight { max_edits: usize },
    /// Left values share their first `len` characters, right values equal.
    PrefixLeftExactRight { len: usize },
}

/// Rule expression in terms of classifier placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockExpr {
    /// All listed columns equal.
    Exact { columns: &'static [ClassifierId] },
    /// A symbolic predicate over two columns.
    Pair {
        left: ClassifierId,
        right: ClassifierId,
        predicate: PairPredicate,
    },
}

/// A declarative blocking rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockingRule {
    pub name: &'static str,
    pub tier: Tier,
    pub expression: BlockExpr,
}

impl BlockingRule {
    /// Classifiers that must be present for the rule to apply.
    pub fn required_columns(&self) -> Vec<ClassifierId> {
        match self.expression {
            BlockExpr::Exact { columns } => columns.to_vec(),
            BlockExpr::Pair { left, right, .. } => vec![left, right],
        }
    }

    /// Whether every required classifier is available.
    pub fn is_satisfiable(&self, available: impl Fn(ClassifierId) -> bool) -> bool {
        self.required_columns().into_iter().all(available)
    }
}

const fn exact(name: &'static str, tier: Tier, columns: &'static [ClassifierId]) -> BlockingRule {
    BlockingRule {
        name,
        tier,
        expression: BlockExpr::Exact { columns },
    }
}

const fn pair(
    name: &'static str,
    left: ClassifierId,
    right: ClassifierId,
    predicate: PairPredicate,
) -> BlockingRule {
    BlockingRule {
        name,
        tier: Tier::Probabilistic,
        expression: BlockExpr::Pair {
            left,
            right,
            predicate,
        },
    }
}

use ClassifierId::*;
use Tier::{Deterministic, Probabilistic};

/// Rules for person datasets.
pub const PERSON_RULES: &[BlockingRule] = &[
    exact(
        "exact_name_and_email",
        Deterministic,
        &[PersonFirstName, PersonLastName, PersonEmail],
    ),
    exact(
        "exact_name_and_phone",
        Deterministic,
        &[PersonFirstName, PersonLastName, PersonPhone],
    ),
    exact("exact_email", Deterministic, &[PersonEmail]),
    exact("exact_phone", Deterministic, &[PersonPhone]),
    exact("exact_social", Deterministic, &[PersonSocial]),
    exact("exact_website", Deterministic, &[PersonWebsite]),
    pair(
        "fuzzy_first_name_exact_last_name",
        PersonFirstName,
        PersonLastName,
        PairPredicate::FuzzyLeftExactRight { max_edits: 2 },
    ),
    pair(
        "first_initial_exact_last_name",
        PersonFirstName,
        PersonLastName,
        PairPredicate::PrefixLeftExactRight { len: 1 },
    ),
    exact("exact_last_name", Probabilistic, &[PersonLastName]),
];

/// Rules for company datasets.
pub const COMPANY_RULES: &[BlockingRule] = &[
    exact(
        "exact_name_and_website",
        Deterministic,
        &[CompanyName, CompanyWebsite],
    ),
    exact("exact_name_and_phone", Deterministic, &[CompanyName, CompanyPhone]),
    exact("exact_email", Deterministic, &[CompanyEmail]),
    exact("exact_phone", Deterministic, &[CompanyPhone]),
    exact("exact_website", Deterministic, &[CompanyWebsite]),
    exact("exact_social", Deterministic, &[CompanySocial]),
    pair(
        "fuzzy_name_exact_phone",
        CompanyName,
        CompanyPhone,
        PairPredicate::FuzzyLeftExactRight { max_edits: 2 },
    ),
    exact("exact_name", Probabilistic, &[CompanyName]),
];

/// The rule table for a dataset type.
pub fn rules_for(dataset_type: DatasetType) -> &'static [BlockingRule] {
    match dataset_type {
        DatasetType::Person => PERSON_RULES,
        DatasetType::Company => COMPANY_RULES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_stay_in_their_namespace() {
        for dataset_type in DatasetType::ALL {
            for rule in rules_for(dataset_type) {
                for id in rule.required_columns() {
                    assert_eq!(id.namespace(), dataset_type, "rule {}", rule.name);
                }
            }
        }
    }

    #[test]
    fn test_deterministic_rules_come_first() {
        for dataset_type in DatasetType::ALL {
            let tiers: Vec<Tier> = rules_for(dataset_type).iter().map(|r| r.tier).collect();
            let first_probabilistic = tiers
                .iter()
                .position(|t| *t == Probabilistic)
                .unwrap_or(tiers.len());
            assert!(tiers[first_probabilistic..].iter().all(|t| *t == Probabilistic));
        }
    }

    #[test]
    fn test_satisfiable() {
        let rule = &PERSON_RULES[0];
        assert!(rule.is_satisfiable(|_| true));
        assert!(!rule.is_satisfiable(|id| id != PersonEmail));
    }
}
