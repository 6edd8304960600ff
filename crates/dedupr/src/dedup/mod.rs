//! Deduplication planning and duplicate resolution.
//!
//! The planner turns classified columns into a [`MatchSpec`]: a tier, the
//! blocking rules the columns satisfy, and comparators. A [`RecordMatcher`]
//! turns the spec into clusters, and [`resolve`] reduces clusters to a
//! canonical/duplicate mapping. The [`Deduplicator`] runs the three steps.

mod matcher;
mod planner;
mod resolver;
pub mod rules;
mod service;
mod spec;

pub use matcher::{CancellationToken, ExactBlockMatcher, MatchCluster, RecordMatcher};
pub use planner::{DEFAULT_MATCH_THRESHOLD, DeduplicationPlanner, PlannerConfig, TierPreference};
pub use resolver::{DuplicateMapping, resolve};
pub use rules::{BlockExpr, BlockingRule, PairPredicate, Tier};
pub use service::{DedupConfig, DeduplicationRequest, DeduplicationResponse, Deduplicator};
pub use spec::{BoundBlockingRule, BoundPredicate, MatchSpec};
