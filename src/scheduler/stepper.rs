//! Step-wise dispatching simulation.
//!
//! [`ScheduleStepper`] holds the explicit simulation state of the
//! dispatching-rule solver and advances it one operation per call. It is also
//! an iterator over independent schedule snapshots, one per step, which is
//! what animation front-ends consume.
//!
//! # Algorithm (one step)
//!
//! 1. Ready set: the next unscheduled operation of every unfinished job, with
//!    earliest start `max(job ready time, machine free time)`.
//! 2. Decision instant `t*`: the minimum earliest start.
//! 3. Among ready operations that can start at `t*`, serve the lowest-id
//!    machine; if several operations contend for it, the rule engine picks one.
//! 4. Place the winner at `t*` and advance machine, job, and cursor state.
//!
//! Contenders of different machines always belong to different jobs, so
//! serving the machines of one instant one at a time gives the same schedule
//! as resolving them all at once.
//!
//! # Complexity
//! O(J) per step for J jobs plus rule evaluation, O(N * J) overall for N operations.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::trace;

use crate::dispatching::{RuleEngine, SchedulingContext};
use crate::error::{JobShopError, Result};
use crate::models::{Instance, Operation, Schedule, ScheduledOperation};

/// Explicit step-state of one dispatching simulation.
///
/// # Example
/// ```
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::DispatchingRuleSolver;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap();
/// let solver = DispatchingRuleSolver::new("shortest_processing_time").unwrap();
///
/// let snapshots: Vec<_> = solver.iterate(&instance).collect::<Result<_, _>>().unwrap();
/// assert_eq!(snapshots.len(), instance.num_operations());
/// assert_eq!(snapshots[0].num_scheduled_operations(), 1);
/// assert_eq!(snapshots.last().unwrap().makespan(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleStepper<'a> {
    instance: &'a Instance,
    engine: RuleEngine,
    seed: u64,
    rng: SmallRng,
    job_cursor: Vec<usize>,
    job_ready_time: Vec<i64>,
    machine_free_time: Vec<i64>,
    remaining_work: Vec<i64>,
    remaining_operations: Vec<usize>,
    current_time: i64,
    schedule: Schedule,
    max_steps: Option<usize>,
    steps_taken: usize,
    failed: bool,
}

impl<'a> ScheduleStepper<'a> {
    /// Creates a stepper at t=0 with an empty schedule.
    pub fn new(instance: &'a Instance, engine: RuleEngine, seed: u64) -> Self {
        Self {
            instance,
            engine,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            job_cursor: vec![0; instance.num_jobs()],
            job_ready_time: vec![0; instance.num_jobs()],
            machine_free_time: vec![0; instance.num_machines()],
            remaining_work: instance.job_durations(),
            remaining_operations: instance.jobs().iter().map(Vec::len).collect(),
            current_time: 0,
            schedule: Schedule::new(instance),
            max_steps: None,
            steps_taken: 0,
            failed: false,
        }
    }

    /// Caps the number of snapshots the iterator yields.
    ///
    /// Only iteration is capped; [`step`](Self::step) ignores the limit.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    /// Restarts the simulation from t=0 with the original seed.
    pub fn reset(&mut self) {
        let max_steps = self.max_steps;
        *self = Self::new(self.instance, self.engine.clone(), self.seed);
        self.max_steps = max_steps;
    }

    /// Seed of the random generator used by this run.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The instance being scheduled.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// The schedule built so far.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Consumes the stepper, returning the schedule built so far.
    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }

    /// Decision instant of the last step (0 before the first step).
    pub fn current_time(&self) -> i64 {
        self.current_time
    }

    /// Number of operations scheduled so far.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Whether every operation has been scheduled.
    pub fn is_finished(&self) -> bool {
        self.remaining_operations.iter().all(|&n| n == 0)
    }

    /// Ready operations with their earliest feasible start.
    pub fn ready_operations(&self) -> Vec<(Operation, i64)> {
        self.instance
            .jobs()
            .iter()
            .zip(&self.job_cursor)
            .filter_map(|(job, &cursor)| job.get(cursor))
            .map(|op| {
                let start = self.job_ready_time[op.job_id].max(self.machine_free_time[op.machine_id]);
                (*op, start)
            })
            .collect()
    }

    /// Schedules exactly one operation.
    ///
    /// Returns the placed operation, or `None` once every operation is
    /// scheduled.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`] if the simulation state is
    /// inconsistent. The stepper must not be used afterwards.
    pub fn step(&mut self) -> Result<Option<ScheduledOperation>> {
        let ready = self.ready_operations();
        let Some(t_star) = ready.iter().map(|&(_, start)| start).min() else {
            return Ok(None);
        };

        let machine = ready
            .iter()
            .filter(|&&(_, start)| start == t_star)
            .map(|(op, _)| op.machine_id)
            .min()
            .ok_or_else(|| JobShopError::ScheduleInvariant("empty decision set".into()))?;
        let contenders: Vec<Operation> = ready
            .iter()
            .filter(|&&(op, start)| start == t_star && op.machine_id == machine)
            .map(|&(op, _)| op)
            .collect();

        let winner = if let [only] = contenders.as_slice() {
            *only
        } else {
            let context = SchedulingContext::new(
                t_star,
                &self.machine_free_time,
                &self.job_ready_time,
                &self.remaining_work,
                &self.remaining_operations,
            );
            let index = self
                .engine
                .select_best(&contenders, &context, &mut self.rng)
                .ok_or_else(|| JobShopError::ScheduleInvariant("rule selected nothing".into()))?;
            contenders[index]
        };

        let placed = self.schedule.dispatch(winner, t_star)?;

        let end = placed.end_time;
        self.current_time = t_star;
        self.machine_free_time[winner.machine_id] = end;
        self.job_ready_time[winner.job_id] = end;
        self.remaining_work[winner.job_id] -= winner.duration;
        self.remaining_operations[winner.job_id] -= 1;
        self.job_cursor[winner.job_id] += 1;
        self.steps_taken += 1;

        trace!(
            operation = %winner,
            start = t_star,
            contenders = contenders.len(),
            "dispatched operation"
        );

        Ok(Some(placed))
    }

    /// Runs the remaining steps and returns the completed schedule.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`] if a step fails or the final
    /// schedule is incomplete.
    pub fn run_to_completion(mut self) -> Result<Schedule> {
        while self.step()?.is_some() {}
        if !self.schedule.is_complete() {
            return Err(JobShopError::ScheduleInvariant(format!(
                "{} of {} operations scheduled",
                self.schedule.num_scheduled_operations(),
                self.instance.num_operations()
            )));
        }
        Ok(self.schedule)
    }

    fn remaining_snapshots(&self) -> usize {
        if self.failed {
            return 0;
        }
        let left = self.instance.num_operations() - self.steps_taken;
        match self.max_steps {
            Some(max) => left.min(max.saturating_sub(self.steps_taken)),
            None => left,
        }
    }
}

impl Iterator for ScheduleStepper<'_> {
    type Item = Result<Schedule>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining_snapshots() == 0 {
            return None;
        }
        match self.step() {
            Ok(Some(_)) => Some(Ok(self.schedule.clone())),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining_snapshots();
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;

    fn scenario_a() -> Instance {
        Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap()
    }

    fn spt_stepper(inst: &Instance) -> ScheduleStepper<'_> {
        ScheduleStepper::new(inst, RuleEngine::new().with_rule(rules::Spt), 0)
    }

    #[test]
    fn test_step_by_step() {
        let inst = scenario_a();
        let mut stepper = spt_stepper(&inst);
        assert_eq!(stepper.ready_operations().len(), 2);

        let first = stepper.step().unwrap().unwrap();
        assert_eq!(first.operation.key(), (1, 0));
        assert_eq!((first.start_time, first.end_time), (0, 1));

        let second = stepper.step().unwrap().unwrap();
        assert_eq!(second.operation.key(), (0, 0));
        assert_eq!(second.start_time, 1);
        assert_eq!(stepper.current_time(), 1);

        stepper.step().unwrap().unwrap();
        stepper.step().unwrap().unwrap();
        assert!(stepper.is_finished());
        assert!(stepper.step().unwrap().is_none());
        assert_eq!(stepper.steps_taken(), 4);
        assert_eq!(stepper.schedule().makespan(), 7);
    }

    #[test]
    fn test_snapshots_are_independent() {
        let inst = scenario_a();
        let snapshots: Vec<Schedule> = spt_stepper(&inst).map(|s| s.unwrap()).collect();
        assert_eq!(snapshots.len(), 4);
        for (i, snap) in snapshots.iter().enumerate() {
            assert_eq!(snap.num_scheduled_operations(), i + 1);
        }
        assert!(!snapshots[0].is_complete());
        assert!(snapshots[3].is_complete());
    }

    #[test]
    fn test_max_steps_and_reset() {
        let inst = scenario_a();
        let mut stepper = spt_stepper(&inst).with_max_steps(2);
        assert_eq!(stepper.size_hint(), (2, Some(2)));
        let partial: Vec<Schedule> = stepper.by_ref().map(|s| s.unwrap()).collect();
        assert_eq!(partial.len(), 2);
        assert!(stepper.next().is_none());

        stepper.reset();
        assert_eq!(stepper.steps_taken(), 0);
        assert_eq!(stepper.schedule().num_scheduled_operations(), 0);
        assert_eq!(stepper.count(), 2);
    }

    #[test]
    fn test_reset_replays_random_run() {
        let inst = Instance::from_jobs(vec![vec![(0, 2)]; 6]).unwrap();
        let engine = RuleEngine::new().with_rule(rules::RandomRule);
        let mut stepper = ScheduleStepper::new(&inst, engine, 99);
        let first: Vec<Schedule> = stepper.by_ref().map(|s| s.unwrap()).collect();
        stepper.reset();
        let second: Vec<Schedule> = stepper.map(|s| s.unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_to_completion() {
        let inst = scenario_a();
        let mut stepper = spt_stepper(&inst);
        stepper.step().unwrap();
        let schedule = stepper.run_to_completion().unwrap();
        assert!(schedule.is_complete());
        assert_eq!(schedule.makespan(), 7);
    }
}
