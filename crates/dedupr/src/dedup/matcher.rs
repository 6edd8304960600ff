//! The record matcher contract and a reference deterministic matcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Row;
use crate::error::MatcherError;

use super::rules::Tier;
use super::spec::{BoundPredicate, MatchSpec};

/// Rows the matcher judged to be the same entity. Order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCluster {
    pub row_ids: Vec<String>,
}

impl MatchCluster {
    pub fn new<I, S>(row_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            row_ids: row_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.row_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }
}

/// Handle to cancel a matcher run, with an optional deadline.
///
/// Clones share the cancel flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancel_flag: Arc<AtomicBool>,
    started: Instant,
    deadline: Option<Instant>,
}

impl CancellationToken {
    /// Create a token with no deadline.
    pub fn new() -> Self {
        Self {
            cancel_flag: Arc::new(AtomicBool::new(false)),
            started: Instant::now(),
            deadline: None,
        }
    }

    /// Create a token that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        let mut token = Self::new();
        token.deadline = Some(token.started + timeout);
        token
    }

    /// A clone sharing the cancel flag whose deadline is at most `timeout`
    /// from now.
    pub fn limited_to(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            cancel_flag: Arc::clone(&self.cancel_flag),
            started: self.started,
            deadline: Some(self.deadline.map_or(deadline, |own| own.min(deadline))),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    /// Whether the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Time since the token was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail if the run should stop.
    pub fn check(&self) -> Result<(), MatcherError> {
        if self.is_cancelled() {
            return Err(MatcherError::Cancelled);
        }
        if self.is_expired() {
            return Err(MatcherError::TimedOut {
                elapsed: self.elapsed(),
            });
        }
        Ok(())
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// External capability that turns a [`MatchSpec`] into clusters.
///
/// An empty result means no duplicates were found. Long-running
/// implementations should call [`CancellationToken::check`] periodically.
pub trait RecordMatcher: Send + Sync {
    /// Name of the matcher.
    fn name(&self) -> &str;

    /// Find clusters of matching rows.
    fn match_records(
        &self,
        rows: &[Row],
        spec: &MatchSpec,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchCluster>, MatcherError>;
}

/// How many rows are keyed between cancellation checks.
const CHECK_INTERVAL: usize = 1024;

/// In-process matcher for the deterministic tier.
///
/// Rows sharing every non-empty key value of any blocking rule end up in one
/// cluster. Probabilistic specs are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactBlockMatcher;

impl ExactBlockMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl RecordMatcher for ExactBlockMatcher {
    fn name(&self) -> &str {
        "exact-block"
    }

    fn match_records(
        &self,
        rows: &[Row],
        spec: &MatchSpec,
        cancel: &CancellationToken,
    ) -> Result<Vec<MatchCluster>, MatcherError> {
        if spec.tier != Tier::Deterministic {
            return Err(MatcherError::Unsupported(
                "exact block matching needs a deterministic spec".to_string(),
            ));
        }

        let mut sets = DisjointSets::new(rows.len());
        for rule in &spec.blocking_rules {
            let BoundPredicate::Exact { column_ids } = &rule.predicate else {
                return Err(MatcherError::Unsupported(format!(
                    "rule '{}' is not an exact block",
                    rule.name
                )));
            };

            let mut first_with_key: HashMap<Vec<&str>, usize> = HashMap::new();
            for (idx, row) in rows.iter().enumerate() {
                if idx % CHECK_INTERVAL == 0 {
                    cancel.check()?;
                }
                let Some(key) = block_key(row, column_ids) else {
                    continue;
                };
                match first_with_key.get(&key) {
                    Some(&first) => sets.union(first, idx),
                    None => {
                        first_with_key.insert(key, idx);
                    }
                }
            }
            debug!(rule = rule.name, keys = first_with_key.len(), "Blocked rows");
        }

        Ok(sets.clusters(rows))
    }
}

/// Key values of a row, or None if any is missing or blank.
fn block_key<'a>(row: &'a Row, column_ids: &[String]) -> Option<Vec<&'a str>> {
    column_ids
        .iter()
        .map(|id| row.get(id).map(str::trim).filter(|v| !v.is_empty()))
        .collect()
}

/// Union-find over row indices.
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut idx: usize) -> usize {
        while self.parent[idx] != idx {
            self.parent[idx] = self.parent[self.parent[idx]];
            idx = self.parent[idx];
        }
        idx
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            self.parent[root_b.max(root_a)] = root_a.min(root_b);
        }
    }

    /// Components with more than one member, in row order.
    fn clusters(&mut self, rows: &[Row]) -> Vec<MatchCluster> {
        let mut members: Vec<Vec<String>> = vec![Vec::new(); rows.len()];
        for (idx, row) in rows.iter().enumerate() {
            let root = self.find(idx);
            members[root].push(row.id.clone());
        }
        members
            .into_iter()
            .filter(|ids| ids.len() > 1)
            .map(MatchCluster::new)
            .collect()
    }
}
