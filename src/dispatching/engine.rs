//! Rule engine for multi-criteria dispatching.
//!
//! Composes multiple dispatching rules with configurable evaluation modes.
//! Scores closer than the engine's epsilon (default `1e-9`) count as equal.
//! Whatever the mode, remaining ties are broken by ascending `job_id`, then
//! ascending `position_in_job`, so every selection is deterministic given the
//! rule scores.
//!
//! Epsilon equality is not transitive, so candidates are never handed to a
//! sort routine with this comparison. Selection is a linear scan in
//! `(job_id, position_in_job)` order instead.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use rand::RngCore;

use super::{DispatchingRule, RuleScore, SchedulingContext};
use crate::models::Operation;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

#[derive(Debug, Clone)]
struct WeightedRule {
    rule: Arc<dyn DispatchingRule>,
    weight: f64,
}

/// A composable rule engine for operation prioritization.
///
/// Each candidate is scored exactly once per call, so rules that draw from
/// the random generator make one independent draw per candidate per decision.
///
/// # Example
/// ```
/// use u_jobshop::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Mwkr)
///     .with_tie_breaker(rules::Spt);
/// assert_eq!(engine.rule_names(), vec!["MWKR", "SPT"]);
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    epsilon: f64,
}

/// Default score tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-9;

impl RuleEngine {
    /// Creates an empty rule engine.
    ///
    /// An empty engine ranks candidates by the final tie-break alone.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_shared_rule(Arc::new(rule))
    }

    /// Adds an already shared rule (weight 1.0).
    pub fn with_shared_rule(mut self, rule: Arc<dyn DispatchingRule>) -> Self {
        self.rules.push(WeightedRule { rule, weight: 1.0 });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: DispatchingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the score tolerance below which two scores are tied.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }

    /// Score tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Names of the configured rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|wr| wr.rule.name().to_string()).collect()
    }

    /// Evaluates a single operation and returns the raw score of each rule.
    pub fn evaluate(
        &self,
        operation: &Operation,
        context: &SchedulingContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(operation, context, rng))
            .collect()
    }

    /// Sorts candidates by priority (highest priority first).
    ///
    /// Returns indices into `candidates`.
    pub fn sort_indices(
        &self,
        candidates: &[Operation],
        context: &SchedulingContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<usize> {
        let keys = self.score_all(candidates, context, rng);
        let mut remaining = Self::key_order(candidates);
        let mut sorted = Vec::with_capacity(remaining.len());
        while let Some(pos) = self.best_position(&remaining, &keys, candidates) {
            sorted.push(remaining.remove(pos));
        }
        sorted
    }

    /// Returns the index of the highest-priority candidate.
    pub fn select_best(
        &self,
        candidates: &[Operation],
        context: &SchedulingContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Option<usize> {
        let keys = self.score_all(candidates, context, rng);
        let order = Self::key_order(candidates);
        self.best_position(&order, &keys, candidates).map(|pos| order[pos])
    }

    /// Candidate indices in ascending `(job_id, position_in_job)` order.
    fn key_order(candidates: &[Operation]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|&i| candidates[i].key());
        order
    }

    /// Position in `order` of the best candidate. The first strictly better
    /// candidate replaces the incumbent, so ties keep the lowest key.
    fn best_position(&self, order: &[usize], keys: &[Vec<RuleScore>], candidates: &[Operation]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (pos, &i) in order.iter().enumerate() {
            let better = match best {
                None => true,
                Some(b) => {
                    let j = order[b];
                    self.compare(&keys[i], &keys[j], &candidates[i], &candidates[j]) == Ordering::Less
                }
            };
            if better {
                best = Some(pos);
            }
        }
        best
    }

    fn score_all(
        &self,
        candidates: &[Operation],
        context: &SchedulingContext<'_>,
        rng: &mut dyn RngCore,
    ) -> Vec<Vec<RuleScore>> {
        candidates
            .iter()
            .map(|op| match self.mode {
                EvaluationMode::Sequential => self.evaluate(op, context, rng),
                EvaluationMode::Weighted => vec![self
                    .rules
                    .iter()
                    .map(|wr| wr.rule.evaluate(op, context, rng) * wr.weight)
                    .sum()],
            })
            .collect()
    }

    fn compare(&self, a: &[RuleScore], b: &[RuleScore], op_a: &Operation, op_b: &Operation) -> Ordering {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                if (x - y).abs() <= self.epsilon {
                    Ordering::Equal
                } else {
                    x.total_cmp(y)
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| op_a.key().cmp(&op_b.key()))
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
