//! Dispatching-rule solver.
//!
//! A greedy, discrete-event constructor: at every decision instant it places
//! one ready operation, resolving machine contention with a dispatching rule.
//! It never backtracks and never fails on a valid instance, but gives no
//! optimality guarantee.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching;
//! Giffler & Thompson (1960), "Algorithms for Solving Production-Scheduling Problems"

use rand::Rng;
use tracing::{debug, info};

use super::ScheduleStepper;
use crate::dispatching::{RuleChoice, RuleEngine};
use crate::error::Result;
use crate::models::{Instance, Schedule};

/// Dispatching-rule solver.
///
/// # Example
///
/// ```
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::DispatchingRuleSolver;
///
/// let instance = Instance::from_jobs(vec![
///     vec![(0, 5), (1, 1)],
///     vec![(0, 1), (1, 5)],
/// ]).unwrap();
///
/// let fcfs = DispatchingRuleSolver::new("first_come_first_served").unwrap();
/// assert_eq!(fcfs.solve(&instance).unwrap().makespan(), 11);
///
/// let spt = DispatchingRuleSolver::new("shortest_processing_time").unwrap();
/// assert_eq!(spt.solve(&instance).unwrap().makespan(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct DispatchingRuleSolver {
    engine: RuleEngine,
    seed: Option<u64>,
}

impl DispatchingRuleSolver {
    /// Creates a solver for a rule name, built-in kind, user rule, or engine.
    ///
    /// # Errors
    /// [`JobShopError::UnknownDispatchingRule`](crate::JobShopError::UnknownDispatchingRule)
    /// for an unrecognized rule name.
    pub fn new(rule: impl Into<RuleChoice>) -> Result<Self> {
        Ok(Self {
            engine: rule.into().into_engine()?,
            seed: None,
        })
    }

    /// Fixes the random seed. Without a seed every run draws a fresh one.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the rule engine.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// The configured rule engine.
    pub fn rule_engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Starts a step-wise run over `instance`.
    ///
    /// Every call starts from scratch with its own random generator.
    pub fn iterate<'a>(&self, instance: &'a Instance) -> ScheduleStepper<'a> {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        debug!(
            instance = instance.name(),
            rules = ?self.engine.rule_names(),
            operations = instance.num_operations(),
            seed,
            "starting dispatching run"
        );
        ScheduleStepper::new(instance, self.engine.clone(), seed)
    }

    /// Builds a complete schedule for `instance`.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`](crate::JobShopError::ScheduleInvariant)
    /// only if the solver's own bookkeeping is broken.
    pub fn solve(&self, instance: &Instance) -> Result<Schedule> {
        let schedule = self.iterate(instance).run_to_completion()?;
        info!(
            instance = instance.name(),
            makespan = schedule.makespan(),
            "dispatching run complete"
        );
        Ok(schedule)
    }
}

/// Solves `instance` with a dispatching rule in one call.
///
/// `rule` is a rule name (e.g. `"most_work_remaining"`), a
/// [`DispatchingRuleKind`](crate::dispatching::DispatchingRuleKind), a user
/// rule, or a [`RuleEngine`]. The rule is resolved before any simulation
/// state is created.
///
/// # Example
/// ```
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::solve;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 3), (1, 2)], vec![(1, 2), (0, 1)]]).unwrap();
/// let schedule = solve(&instance, "random", Some(42)).unwrap();
/// assert_eq!(schedule.makespan(), 5);
/// assert!(solve(&instance, "unknown_rule", None).is_err());
/// ```
pub fn solve(instance: &Instance, rule: impl Into<RuleChoice>, seed: Option<u64>) -> Result<Schedule> {
    let mut solver = DispatchingRuleSolver::new(rule)?;
    solver.seed = seed;
    solver.solve(instance)
}
