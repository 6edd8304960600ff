//! Integration tests for deduplication planning, matching and resolution.

use std::time::Duration;

use dedupr::classifier::{ClassifierId, ClassifierRegistry, DatasetType};
use dedupr::dataset::{Column, Dataset, Row};
use dedupr::dedup::{
    CancellationToken, DedupConfig, DeduplicationPlanner, DeduplicationRequest, Deduplicator,
    ExactBlockMatcher, MatchCluster, MatchSpec, PlannerConfig, RecordMatcher, Tier,
    TierPreference,
};
use dedupr::{DeduprError, MatcherError, PlanningFailure};

/// Matcher that ignores its input and returns fixed clusters.
struct StubMatcher {
    clusters: Vec<MatchCluster>,
}

impl RecordMatcher for StubMatcher {
    fn name(&self) -> &str {
        "stub"
    }

    fn match_records(
        &self,
        _rows: &[Row],
        _spec: &MatchSpec,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchCluster>, MatcherError> {
        cancel.check()?;
        Ok(self.clusters.clone())
    }
}

/// Matcher that sleeps past any short deadline.
struct SlowMatcher;

impl RecordMatcher for SlowMatcher {
    fn name(&self) -> &str {
        "slow"
    }

    fn match_records(
        &self,
        _rows: &[Row],
        _spec: &MatchSpec,
        _cancel: &CancellationToken,
    ) -> Result<Vec<MatchCluster>, MatcherError> {
        std::thread::sleep(Duration::from_millis(50));
        Ok(Vec::new())
    }
}

fn text(items: &[&str]) -> Vec<Option<String>> {
    items.iter().map(|v| Some(v.to_string())).collect()
}

fn people() -> Dataset {
    Dataset::new(
        vec![
            Column::new("email", "Email", text(&["ada@x.org", "ada@x.org", "alan@y.org"]))
                .with_classification(ClassifierId::PersonEmail),
            Column::new("first_name", "First Name", text(&["Ada", "Ada", "Alan"]))
                .with_classification(ClassifierId::PersonFirstName),
            Column::new("last_name", "Last Name", text(&["Lovelace", "Byron", "Turing"]))
                .with_classification(ClassifierId::PersonLastName),
            Column::new("notes", "Notes", text(&["a", "b", "c"])),
        ],
        vec!["row1".into(), "row2".into(), "row3".into()],
    )
    .expect("valid dataset")
}

fn all_columns() -> Vec<String> {
    vec!["email".into(), "first_name".into(), "last_name".into()]
}

#[test]
fn test_email_duplicates_with_stub_matcher() {
    let registry = ClassifierRegistry::new();
    let dedup = Deduplicator::new(&registry);
    let matcher = StubMatcher {
        clusters: vec![MatchCluster::new(["row2", "row1"])],
    };
    let request = DeduplicationRequest::new(all_columns(), DatasetType::Person);

    let response = dedup
        .deduplicate(&people(), &request, &matcher, &CancellationToken::new())
        .unwrap();

    assert_eq!(response.tier, Some(Tier::Deterministic));
    assert_eq!(response.error_code, None);
    assert_eq!(response.original_count, 3);
    assert_eq!(response.deduplicated_count, 2);
    assert_eq!(response.mapping.len(), 1);
    assert_eq!(response.mapping.canonical("row2"), "row1");
    assert!(!response.mapping.is_duplicate("row1"));
}

#[test]
fn test_planner_selects_deterministic_email_rule() {
    let registry = ClassifierRegistry::new();
    let planner = DeduplicationPlanner::new(&registry);

    let spec = planner
        .plan(&people().column_defs(), &all_columns(), DatasetType::Person)
        .unwrap();

    assert_eq!(spec.tier, Tier::Deterministic);
    assert!(spec.rule_names().contains(&"exact_email"));
    assert!(spec.render_predicates().contains(&"l.email = r.email".to_string()));
}

#[test]
fn test_exact_block_matcher_end_to_end() {
    let registry = ClassifierRegistry::new();
    let dedup = Deduplicator::new(&registry);
    let request = DeduplicationRequest::new(vec!["email".into()], DatasetType::Person);

    let response = dedup
        .deduplicate(&people(), &request, &ExactBlockMatcher::new(), &CancellationToken::new())
        .unwrap();

    assert_eq!(response.deduplicated_count, 2);
    assert_eq!(response.mapping.canonical("row2"), "row1");
    assert_eq!(response.mapping.canonical("row3"), "row3");
}

#[test]
fn test_unclassified_selection_reports_failure() {
    let registry = ClassifierRegistry::new();
    let dedup = Deduplicator::new(&registry);
    let matcher = StubMatcher { clusters: vec![] };
    let request = DeduplicationRequest::new(vec!["notes".into()], DatasetType::Person);

    let response = dedup
        .deduplicate(&people(), &request, &matcher, &CancellationToken::new())
        .unwrap();

    assert_eq!(response.error_code, Some(PlanningFailure::NoClassifiedColumns));
    assert_eq!(response.original_count, 3);
    assert_eq!(response.deduplicated_count, 0);
    assert!(response.mapping.is_empty());
    assert_eq!(response.tier, None);
}

#[test]
fn test_wrong_dataset_type_is_unclassified() {
    let registry = ClassifierRegistry::new();
    let dedup = Deduplicator::new(&registry);
    let matcher = StubMatcher { clusters: vec![] };
    let request = DeduplicationRequest::new(all_columns(), DatasetType::Company);

    let response = dedup
        .deduplicate(&people(), &request, &matcher, &CancellationToken::new())
        .unwrap();

    assert_eq!(response.error_code, Some(PlanningFailure::NoClassifiedColumns));
}

#[test]
fn test_forced_probabilistic_tier() {
    let registry = ClassifierRegistry::new();
    let config = DedupConfig::default().with_planner(
        PlannerConfig::default().with_tier_preference(TierPreference::Probabilistic),
    );
    let dedup = Deduplicator::with_config(&registry, config);
    let matcher = StubMatcher {
        clusters: vec![MatchCluster::new(["row1", "row2"])],
    };
    let request = DeduplicationRequest::new(all_columns(), DatasetType::Person);

    let response = dedup
        .deduplicate(&people(), &request, &matcher, &CancellationToken::new())
        .unwrap();
    assert_eq!(response.tier, Some(Tier::Probabilistic));
    assert_eq!(response.duplicate_count(), 1);
}

#[test]
fn test_cancelled_token_aborts() {
    let registry = ClassifierRegistry::new();
    let dedup = Deduplicator::new(&registry);
    let matcher = StubMatcher {
        clusters: vec![MatchCluster::new(["row1", "row2"])],
    };
    let request = DeduplicationRequest::new(all_columns(), DatasetType::Person);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = dedup
        .deduplicate(&people(), &request, &matcher, &cancel)
        .unwrap_err();
    assert!(matches!(err, DeduprError::Matcher(MatcherError::Cancelled)));
}

#[test]
fn test_deadline_expiry_times_out() {
    let registry = ClassifierRegistry::new();
    let config = DedupConfig::default().with_timeout(Duration::from_millis(5));
    let dedup = Deduplicator::with_config(&registry, config);
    let request = DeduplicationRequest::new(all_columns(), DatasetType::Person);
    let cancel = dedup.cancellation_token();

    let err = dedup
        .deduplicate(&people(), &request, &SlowMatcher, &cancel)
        .unwrap_err();
    assert!(matches!(
        err,
        DeduprError::Matcher(MatcherError::TimedOut { .. })
    ));
}

#[test]
fn test_matcher_unknown_rows_are_ignored() {
    let registry = ClassifierRegistry::new();
    let dedup = Deduplicator::new(&registry);
    let matcher = StubMatcher {
        clusters: vec![MatchCluster::new(["row3", "ghost"])],
    };
    let request = DeduplicationRequest::new(all_columns(), DatasetType::Person);

    let response = dedup
        .deduplicate(&people(), &request, &matcher, &CancellationToken::new())
        .unwrap();
    assert!(response.mapping.is_empty());
    assert_eq!(response.reason, "No duplicates found");
}
