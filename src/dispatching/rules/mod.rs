//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Time-based**: SPT, LPT
//! - **Work-content**: MWKR, LWKR, MOPNR
//! - **Queue**: FCFS
//! - **Stochastic**: RANDOM
//! - **Custom**: any closure via [`from_fn`]
//!
//! # Score Convention
//! All rules return lower scores for higher priority operations.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use rand::{Rng, RngCore};

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Operation;

// ======================== Time-based rules ========================

/// Shortest Processing Time.
///
/// Prioritizes the operation with the shortest duration.
///
/// # Reference
/// Smith (1956), optimal for minimizing mean flow time on single machine.
#[derive(Debug, Clone, Copy)]
pub struct Spt;

impl DispatchingRule for Spt {
    fn name(&self) -> &str {
        "SPT"
    }

    fn evaluate(&self, op: &Operation, _ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        op.duration as f64
    }

    fn description(&self) -> &str {
        "Shortest Processing Time"
    }
}

/// Longest Processing Time.
#[derive(Debug, Clone, Copy)]
pub struct Lpt;

impl DispatchingRule for Lpt {
    fn name(&self) -> &str {
        "LPT"
    }

    fn evaluate(&self, op: &Operation, _ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        -(op.duration as f64)
    }

    fn description(&self) -> &str {
        "Longest Processing Time"
    }
}

// ======================== Work-content rules ========================

/// Most Work Remaining.
///
/// Score is the negated duration sum of this operation and every later
/// operation of its job, so the job with the most work left wins.
/// Prevents starvation of long jobs.
#[derive(Debug, Clone, Copy)]
pub struct Mwkr;

impl DispatchingRule for Mwkr {
    fn name(&self) -> &str {
        "MWKR"
    }

    fn evaluate(&self, op: &Operation, ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        -(ctx.remaining_work(op) as f64)
    }

    fn description(&self) -> &str {
        "Most Work Remaining"
    }
}

/// Least Work Remaining.
///
/// Prioritizes jobs closest to completion.
#[derive(Debug, Clone, Copy)]
pub struct Lwkr;

impl DispatchingRule for Lwkr {
    fn name(&self) -> &str {
        "LWKR"
    }

    fn evaluate(&self, op: &Operation, ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        ctx.remaining_work(op) as f64
    }

    fn description(&self) -> &str {
        "Least Work Remaining"
    }
}

/// Most Operations Remaining.
#[derive(Debug, Clone, Copy)]
pub struct Mopnr;

impl DispatchingRule for Mopnr {
    fn name(&self) -> &str {
        "MOPNR"
    }

    fn evaluate(&self, op: &Operation, ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        -(ctx.remaining_operations(op) as f64)
    }

    fn description(&self) -> &str {
        "Most Operations Remaining"
    }
}

// ======================== Queue rules ========================

/// First Come First Served.
///
/// Score is the instant the operation entered the ready set, i.e. the
/// completion time of its job predecessor (0 for first operations).
#[derive(Debug, Clone, Copy)]
pub struct Fcfs;

impl DispatchingRule for Fcfs {
    fn name(&self) -> &str {
        "FCFS"
    }

    fn evaluate(&self, op: &Operation, ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        ctx.arrival_time(op) as f64
    }

    fn description(&self) -> &str {
        "First Come First Served"
    }
}

// ======================== Stochastic rule ========================

/// Uniform random priority.
///
/// Draws one value in `[0, 1)` per candidate per decision from the
/// solver-owned generator; reproducible for a fixed seed.
#[derive(Debug, Clone, Copy)]
pub struct RandomRule;

impl DispatchingRule for RandomRule {
    fn name(&self) -> &str {
        "RANDOM"
    }

    fn evaluate(&self, _op: &Operation, _ctx: &SchedulingContext<'_>, rng: &mut dyn RngCore) -> RuleScore {
        rng.random::<f64>()
    }

    fn description(&self) -> &str {
        "Random"
    }
}

// ======================== Custom rules ========================

/// A rule backed by a scoring closure. Created with [`from_fn`].
pub struct FnRule<F> {
    name: String,
    score: F,
}

/// Wraps a scoring closure as a dispatching rule.
///
/// # Example
/// ```
/// use u_jobshop::dispatching::rules;
///
/// // Prefer the job with the lowest id, regardless of anything else.
/// let rule = rules::from_fn("LOWEST_JOB", |op, _ctx| op.job_id as f64);
/// ```
pub fn from_fn<F>(name: impl Into<String>, score: F) -> FnRule<F>
where
    F: Fn(&Operation, &SchedulingContext<'_>) -> RuleScore + Send + Sync,
{
    FnRule {
        name: name.into(),
        score,
    }
}

impl<F> DispatchingRule for FnRule<F>
where
    F: Fn(&Operation, &SchedulingContext<'_>) -> RuleScore + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, op: &Operation, ctx: &SchedulingContext<'_>, _rng: &mut dyn RngCore) -> RuleScore {
        (self.score)(op, ctx)
    }
}

impl<F> std::fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}
