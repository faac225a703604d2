//! Dispatching rules and rule engine.
//!
//! A dispatching rule scores the ready operations competing for a machine at
//! a decision instant. The solver asks the [`RuleEngine`] for the winner.
//!
//! # Usage
//!
//! ```
//! use u_jobshop::dispatching::{rules, DispatchingRuleKind, RuleEngine};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Mwkr)
//!     .with_tie_breaker(rules::Spt);
//!
//! let kind: DispatchingRuleKind = "shortest_processing_time".parse().unwrap();
//! assert_eq!(kind, DispatchingRuleKind::ShortestProcessingTime);
//! assert!("earliest_due_date".parse::<DispatchingRuleKind>().is_err());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod context;
mod engine;
mod kind;
pub mod rules;

pub use context::SchedulingContext;
pub use engine::{EvaluationMode, RuleEngine, DEFAULT_EPSILON};
pub use kind::{DispatchingRuleKind, RuleChoice};

use crate::models::Operation;
use rand::RngCore;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A dispatching rule that scores a ready operation.
///
/// # Score Convention
/// **Lower score = higher priority.** Ties are broken by the engine by
/// ascending `job_id`, then ascending `position_in_job`.
///
/// # Randomness
/// `rng` is owned by the running solver and seeded per invocation. Rules that
/// do not need randomness must not draw from it, so that deterministic rules
/// leave the random stream untouched.
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SPT").
    fn name(&self) -> &str;

    /// Scores `operation` in the current context.
    fn evaluate(
        &self,
        operation: &Operation,
        context: &SchedulingContext<'_>,
        rng: &mut dyn RngCore,
    ) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &str {
        self.name()
    }
}
