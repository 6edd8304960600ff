//! Chooses a matching tier and blocking rules from classified columns.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{ClassifierId, ClassifierRegistry, ComparatorSpec, DatasetType};
use crate::dataset::ColumnDef;
use crate::error::PlanningFailure;

use super::rules::{BlockExpr, BlockingRule, Tier, rules_for};
use super::spec::{BoundBlockingRule, BoundPredicate, MatchSpec};

/// Default probability at or above which a scored pair is linked.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// Which tier the planner may choose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierPreference {
    /// Deterministic whenever a deterministic rule applies, else probabilistic.
    #[default]
    Auto,
    /// Only deterministic rules.
    Deterministic,
    /// Always the probabilistic tier, blocking on every satisfiable rule.
    Probabilistic,
}

impl FromStr for TierPreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(TierPreference::Auto),
            "deterministic" => Ok(TierPreference::Deterministic),
            "probabilistic" => Ok(TierPreference::Probabilistic),
            other => Err(format!("Invalid tier preference: {}", other)),
        }
    }
}

/// Planner configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub tier_preference: TierPreference,
    /// Match probability threshold passed to probabilistic matchers.
    pub match_threshold: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tier_preference: TierPreference::Auto,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl PlannerConfig {
    pub fn with_tier_preference(mut self, tier_preference: TierPreference) -> Self {
        self.tier_preference = tier_preference;
        self
    }

    pub fn with_match_threshold(mut self, match_threshold: f64) -> Self {
        self.match_threshold = match_threshold;
        self
    }
}

/// Builds a [`MatchSpec`] from classified column definitions.
#[derive(Debug, Clone)]
pub struct DeduplicationPlanner<'r> {
    registry: &'r ClassifierRegistry,
    config: PlannerConfig,
}

impl<'r> DeduplicationPlanner<'r> {
    /// Create a planner with default configuration.
    pub fn new(registry: &'r ClassifierRegistry) -> Self {
        Self::with_config(registry, PlannerConfig::default())
    }

    /// Create a planner with custom configuration.
    pub fn with_config(registry: &'r ClassifierRegistry, config: PlannerConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan deduplication over the eligible columns.
    ///
    /// Only columns whose classifier is allowed for `dataset_type` take part.
    /// When two eligible columns share a classifier, the first in column
    /// order is used.
    pub fn plan(
        &self,
        columns: &[ColumnDef],
        eligible_column_ids: &[String],
        dataset_type: DatasetType,
    ) -> Result<MatchSpec, PlanningFailure> {
        if eligible_column_ids.is_empty() {
            return Err(PlanningFailure::NoColumnsSelected);
        }

        let classified = self.classified_columns(columns, eligible_column_ids, dataset_type);
        if classified.is_empty() {
            return Err(PlanningFailure::NoClassifiedColumns);
        }

        let satisfiable: Vec<&BlockingRule> = rules_for(dataset_type)
            .iter()
            .filter(|rule| rule.is_satisfiable(|id| classified.contains_key(&id)))
            .collect();
        for rule in &satisfiable {
            debug!(rule = rule.name, tier = %rule.tier, "Blocking rule satisfiable");
        }
        if satisfiable.is_empty() {
            return Err(PlanningFailure::NoMatchingRules);
        }

        let deterministic: Vec<&BlockingRule> = satisfiable
            .iter()
            .copied()
            .filter(|rule| rule.tier == Tier::Deterministic)
            .collect();
        let probabilistic: Vec<&BlockingRule> = satisfiable
            .iter()
            .copied()
            .filter(|rule| rule.tier == Tier::Probabilistic)
            .collect();

        let (tier, rules) = match self.config.tier_preference {
            TierPreference::Auto if !deterministic.is_empty() => (Tier::Deterministic, deterministic),
            TierPreference::Auto => (Tier::Probabilistic, probabilistic),
            TierPreference::Deterministic if deterministic.is_empty() => {
                return Err(PlanningFailure::NoMatchingRules);
            }
            TierPreference::Deterministic => (Tier::Deterministic, deterministic),
            TierPreference::Probabilistic => (Tier::Probabilistic, satisfiable),
        };

        let comparators = match tier {
            Tier::Deterministic => Vec::new(),
            Tier::Probabilistic => {
                let comparators = self.comparators(columns, &classified);
                if comparators.is_empty() {
                    return Err(PlanningFailure::NoComparisons);
                }
                comparators
            }
        };

        let blocking_rules: Vec<BoundBlockingRule> = rules
            .into_iter()
            .map(|rule| bind_rule(rule, &classified))
            .collect();

        info!(
            %dataset_type,
            %tier,
            rules = blocking_rules.len(),
            comparators = comparators.len(),
            "Planned deduplication"
        );

        Ok(MatchSpec {
            dataset_type,
            tier,
            blocking_rules,
            comparators,
            match_threshold: self.config.match_threshold,
        })
    }

    /// Map each usable classifier to the first eligible column carrying it.
    fn classified_columns<'c>(
        &self,
        columns: &'c [ColumnDef],
        eligible_column_ids: &[String],
        dataset_type: DatasetType,
    ) -> BTreeMap<ClassifierId, &'c str> {
        let mut classified = BTreeMap::new();
        for column in columns {
            if !eligible_column_ids.iter().any(|id| *id == column.id) {
                continue;
            }
            let Some(classification) = column.classification else {
                continue;
            };
            if !self
                .registry
                .get(classification)
                .is_some_and(|c| c.allows(dataset_type))
            {
                debug!(column = %column.id, %classification, "Classification not usable for dataset type");
                continue;
            }
            classified.entry(classification).or_insert(column.id.as_str());
        }
        classified
    }

    /// Comparators of the classified columns, in column order.
    fn comparators(
        &self,
        columns: &[ColumnDef],
        classified: &BTreeMap<ClassifierId, &str>,
    ) -> Vec<ComparatorSpec> {
        columns
            .iter()
            .filter_map(|column| {
                let classification = column.classification?;
                if classified.get(&classification) != Some(&column.id.as_str()) {
                    return None;
                }
                self.registry
                    .bind(classification, &column.id)?
                    .comparator_spec()
            })
            .collect()
    }
}

fn bind_rule(rule: &BlockingRule, classified: &BTreeMap<ClassifierId, &str>) -> BoundBlockingRule {
    // Only satisfiable rules are bound, so every placeholder resolves.
    let column = |id: ClassifierId| classified.get(&id).copied().unwrap_or_default().to_string();
    let predicate = match rule.expression {
        BlockExpr::Exact { columns } => BoundPredicate::Exact {
            column_ids: columns.iter().map(|id| column(*id)).collect(),
        },
        BlockExpr::Pair {
            left,
            right,
            predicate,
        } => BoundPredicate::Pair {
            left: column(left),
            right: column(right),
            predicate,
        },
    };
    BoundBlockingRule {
        name: rule.name,
        tier: rule.tier,
        predicate,
    }
}
