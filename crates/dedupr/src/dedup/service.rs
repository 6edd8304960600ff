//! Plan → match → resolve over a read-only dataset snapshot.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::{ClassifierRegistry, DatasetType};
use crate::dataset::Dataset;
use crate::error::{PlanningFailure, Result};

use super::matcher::{CancellationToken, MatchCluster, RecordMatcher};
use super::planner::{DeduplicationPlanner, PlannerConfig};
use super::resolver::{DuplicateMapping, resolve};
use super::rules::Tier;

/// Deduplication service configuration.
#[derive(Debug, Clone, Default)]
pub struct DedupConfig {
    pub planner: PlannerConfig,
    /// Deadline for the matcher call, applied on top of any deadline the
    /// caller's token already carries.
    pub timeout: Option<Duration>,
}

impl DedupConfig {
    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A request to deduplicate a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeduplicationRequest {
    /// Columns eligible for matching.
    pub column_ids: Vec<String>,
    pub dataset_type: DatasetType,
}

impl DeduplicationRequest {
    pub fn new(column_ids: Vec<String>, dataset_type: DatasetType) -> Self {
        Self {
            column_ids,
            dataset_type,
        }
    }
}

/// Outcome of a deduplication run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeduplicationResponse {
    pub original_count: usize,
    pub deduplicated_count: usize,
    /// Human-readable summary.
    pub reason: String,
    /// Set when planning failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<PlanningFailure>,
    /// Tier used, when a plan was built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    #[serde(default)]
    pub mapping: DuplicateMapping,
}

impl DeduplicationResponse {
    fn planning_failed(original_count: usize, failure: PlanningFailure) -> Self {
        Self {
            original_count,
            deduplicated_count: 0,
            reason: failure.reason().to_string(),
            error_code: Some(failure),
            tier: None,
            mapping: DuplicateMapping::default(),
        }
    }

    /// Number of rows found to duplicate another.
    pub fn duplicate_count(&self) -> usize {
        self.mapping.len()
    }
}

/// Runs deduplication against a record matcher.
#[derive(Debug, Clone)]
pub struct Deduplicator<'r> {
    registry: &'r ClassifierRegistry,
    config: DedupConfig,
}

impl<'r> Deduplicator<'r> {
    pub fn new(registry: &'r ClassifierRegistry) -> Self {
        Self::with_config(registry, DedupConfig::default())
    }

    pub fn with_config(registry: &'r ClassifierRegistry, config: DedupConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// A fresh token carrying the configured timeout.
    pub fn cancellation_token(&self) -> CancellationToken {
        match self.config.timeout {
            Some(timeout) => CancellationToken::with_timeout(timeout),
            None => CancellationToken::new(),
        }
    }

    /// Deduplicate a dataset snapshot.
    ///
    /// Planning failures are reported in the response. Matcher failures,
    /// cancellation and timeouts are returned as errors. The dataset is
    /// never written.
    pub fn deduplicate(
        &self,
        dataset: &Dataset,
        request: &DeduplicationRequest,
        matcher: &dyn RecordMatcher,
        cancel: &CancellationToken,
    ) -> Result<DeduplicationResponse> {
        let original_count = dataset.row_count();
        let planner = DeduplicationPlanner::with_config(self.registry, self.config.planner.clone());

        let spec = match planner.plan(&dataset.column_defs(), &request.column_ids, request.dataset_type) {
            Ok(spec) => spec,
            Err(failure) => {
                info!(code = failure.code(), "Deduplication not planned");
                return Ok(DeduplicationResponse::planning_failed(original_count, failure));
            }
        };

        let limited;
        let cancel = match self.config.timeout {
            Some(timeout) => {
                limited = cancel.limited_to(timeout);
                &limited
            }
            None => cancel,
        };

        cancel.check()?;
        let rows = dataset.rows();
        let clusters = matcher.match_records(&rows, &spec, cancel)?;
        cancel.check()?;

        let clusters = known_rows_only(clusters, dataset.row_ids());
        let mapping = resolve(&clusters);
        let deduplicated_count = original_count - mapping.len();

        let reason = if mapping.is_empty() {
            "No duplicates found".to_string()
        } else {
            format!(
                "Found {} duplicate rows using {} matching ({})",
                mapping.len(),
                spec.tier,
                matcher.name()
            )
        };

        info!(
            matcher = matcher.name(),
            tier = %spec.tier,
            original_count,
            deduplicated_count,
            elapsed_ms = cancel.elapsed().as_millis() as u64,
            "Deduplication finished"
        );

        Ok(DeduplicationResponse {
            original_count,
            deduplicated_count,
            reason,
            error_code: None,
            tier: Some(spec.tier),
            mapping,
        })
    }
}

/// Drop row ids the dataset does not contain.
fn known_rows_only(clusters: Vec<MatchCluster>, row_ids: &[String]) -> Vec<MatchCluster> {
    let known: HashSet<&str> = row_ids.iter().map(String::as_str).collect();
    clusters
        .into_iter()
        .map(|mut cluster| {
            let before = cluster.len();
            cluster.row_ids.retain(|id| known.contains(id.as_str()));
            if cluster.len() < before {
                warn!(dropped = before - cluster.len(), "Matcher returned unknown row ids");
            }
            cluster
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierId;
    use crate::dataset::{Column, Row};
    use crate::dedup::spec::MatchSpec;
    use crate::error::{DeduprError, MatcherError};

    struct FixedMatcher(Vec<MatchCluster>);

    impl RecordMatcher for FixedMatcher {
        fn name(&self) -> &str {
            "fixed"
        }

        fn match_records(
            &self,
            _rows: &[Row],
            _spec: &MatchSpec,
            _cancel: &CancellationToken,
        ) -> std::result::Result<Vec<MatchCluster>, MatcherError> {
            Ok(self.0.clone())
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            vec![
                Column::new("email", "Email", vec![Some("a@x.org".into()), Some("a@x.org".into()), None])
                    .with_classification(ClassifierId::PersonEmail),
            ],
            vec!["r1".into(), "r2".into(), "r3".into()],
        )
        .unwrap()
    }

    fn request() -> DeduplicationRequest {
        DeduplicationRequest::new(vec!["email".to_string()], DatasetType::Person)
    }

    #[test]
    fn test_unknown_row_ids_are_ignored() {
        let registry = ClassifierRegistry::new();
        let service = Deduplicator::new(&registry);
        let matcher = FixedMatcher(vec![MatchCluster::new(["r2", "r1", "ghost"])]);
        let response = service
            .deduplicate(&dataset(), &request(), &matcher, &CancellationToken::new())
            .unwrap();

        assert_eq!(response.duplicate_count(), 1);
        assert_eq!(response.deduplicated_count, 2);
        assert_eq!(response.tier, Some(Tier::Deterministic));
    }

    #[test]
    fn test_empty_result_means_no_duplicates() {
        let registry = ClassifierRegistry::new();
        let service = Deduplicator::new(&registry);
        let response = service
            .deduplicate(&dataset(), &request(), &FixedMatcher(vec![]), &CancellationToken::new())
            .unwrap();
        assert_eq!(response.deduplicated_count, response.original_count);
        assert!(response.error_code.is_none());
        assert_eq!(response.reason, "No duplicates found");
    }

    #[test]
    fn test_cancelled_before_matching() {
        let registry = ClassifierRegistry::new();
        let service = Deduplicator::new(&registry);
        let token = CancellationToken::new();
        token.cancel();
        let err = service
            .deduplicate(&dataset(), &request(), &FixedMatcher(vec![]), &token)
            .unwrap_err();
        assert!(matches!(err, DeduprError::Matcher(MatcherError::Cancelled)));
    }

    #[test]
    fn test_configured_timeout() {
        let registry = ClassifierRegistry::new();
        let config = DedupConfig::default().with_timeout(Duration::ZERO);
        let service = Deduplicator::with_config(&registry, config);
        let err = service
            .deduplicate(
                &dataset(),
                &request(),
                &FixedMatcher(vec![]),
                &service.cancellation_token(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            DeduprError::Matcher(MatcherError::TimedOut { .. })
        ));
    }

    #[test]
    fn test_configured_timeout_applies_to_caller_token() {
        let registry = ClassifierRegistry::new();
        let config = DedupConfig::default().with_timeout(Duration::ZERO);
        let service = Deduplicator::with_config(&registry, config);
        let caller_token = CancellationToken::new();
        let err = service
            .deduplicate(&dataset(), &request(), &FixedMatcher(vec![]), &caller_token)
            .unwrap_err();
        assert!(matches!(
            err,
            DeduprError::Matcher(MatcherError::TimedOut { .. })
        ));
        assert!(!caller_token.is_expired());
    }
}
