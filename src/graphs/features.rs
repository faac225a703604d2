//! Per-node state features.
//!
//! Snapshots the progress of a (partial) schedule as numeric features for
//! operation, machine, and job nodes, so that a graph built from the same
//! instance can be annotated at any point of a dispatching run.
//!
//! | Node | Features |
//! |------|----------|
//! | operation | duration, position in job, is scheduled, is completed, earliest start |
//! | machine | earliest start, is completed, remaining operations |
//! | job | earliest start, is completed, remaining operations |
//!
//! Earliest starts are relative to the snapshot time and may be negative
//! for work that already started. An operation is completed once its end
//! time is `<=` the snapshot time; a machine or job is completed once none
//! of its operations is left uncompleted, so a machine without operations is
//! always completed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{JobShopGraph, Node, NodeValue};
use crate::error::{JobShopError, Result};
use crate::models::{Instance, Schedule};
use crate::scheduler::ScheduleStepper;

/// Features of one operation node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationFeatures {
    /// Processing time.
    pub duration: i64,
    /// Position within the job (0-indexed).
    pub position_in_job: usize,
    /// Placed in the schedule (possibly still running).
    pub is_scheduled: bool,
    /// Finished at the snapshot time.
    pub is_completed: bool,
    /// Scheduled start, or `max(job ready, machine free)` if unscheduled,
    /// minus the snapshot time.
    pub earliest_start: i64,
}

impl OperationFeatures {
    /// Column names of [`to_vec`](Self::to_vec).
    pub const NAMES: [&'static str; 5] = [
        "duration",
        "position_in_job",
        "is_scheduled",
        "is_completed",
        "earliest_start",
    ];

    /// Numeric row; booleans become 0 or 1.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.duration as f64,
            self.position_in_job as f64,
            f64::from(u8::from(self.is_scheduled)),
            f64::from(u8::from(self.is_completed)),
            self.earliest_start as f64,
        ]
    }
}

/// Features of one machine or job node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceFeatures {
    /// Next free time minus the snapshot time.
    pub earliest_start: i64,
    /// No operation left uncompleted.
    pub is_completed: bool,
    /// Operations not yet scheduled.
    pub remaining_operations: usize,
}

impl ResourceFeatures {
    /// Column names of [`to_vec`](Self::to_vec).
    pub const NAMES: [&'static str; 3] = ["earliest_start", "is_completed", "remaining_operations"];

    /// Numeric row; booleans become 0 or 1.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.earliest_start as f64,
            f64::from(u8::from(self.is_completed)),
            self.remaining_operations as f64,
        ]
    }
}

/// Feature tables of every operation, machine, and job at one instant.
///
/// Tables are indexed by `operation_id`, machine id, and job id.
///
/// # Example
/// ```
/// use u_jobshop::graphs::NodeFeatures;
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::DispatchingRuleSolver;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap();
/// let solver = DispatchingRuleSolver::new("shortest_processing_time").unwrap();
/// let mut stepper = solver.iterate(&instance);
/// stepper.step().unwrap();
///
/// let features = NodeFeatures::from_stepper(&stepper);
/// assert!(features.operations[2].is_scheduled);
/// assert_eq!(features.machines[0].earliest_start, 1);
/// assert_eq!(features.jobs[0].remaining_operations, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeFeatures {
    /// Snapshot time all relative values refer to.
    pub current_time: i64,
    /// By `operation_id`.
    pub operations: Vec<OperationFeatures>,
    /// By machine id.
    pub machines: Vec<ResourceFeatures>,
    /// By job id.
    pub jobs: Vec<ResourceFeatures>,
}

impl NodeFeatures {
    /// Features of a stepper's partial schedule at its current time.
    pub fn from_stepper(stepper: &ScheduleStepper<'_>) -> Self {
        Self::compute(stepper.instance(), stepper.schedule(), stepper.current_time())
    }

    /// Features of `schedule` at `current_time`.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`] if `schedule` was not built for
    /// `instance`.
    pub fn from_schedule(instance: &Instance, schedule: &Schedule, current_time: i64) -> Result<Self> {
        if schedule.machine_sequences().len() != instance.num_machines()
            || schedule.job_ready_times().len() != instance.num_jobs()
        {
            return Err(JobShopError::ScheduleInvariant(format!(
                "schedule with {} machines and {} jobs does not match instance {}",
                schedule.machine_sequences().len(),
                schedule.job_ready_times().len(),
                instance.name()
            )));
        }
        if let Some(s) = schedule.scheduled_operations().find(|s| {
            instance.operation(s.job_id(), s.operation.position_in_job) != Some(&s.operation)
        }) {
            return Err(JobShopError::ScheduleInvariant(format!(
                "{} is not an operation of instance {}",
                s.operation,
                instance.name()
            )));
        }
        Ok(Self::compute(instance, schedule, current_time))
    }

    fn compute(instance: &Instance, schedule: &Schedule, current_time: i64) -> Self {
        let machine_free: Vec<i64> = (0..instance.num_machines())
            .map(|m| schedule.machine_sequence(m).last().map_or(0, |s| s.end_time))
            .collect();
        let job_ready = schedule.job_ready_times();

        let mut operations: Vec<OperationFeatures> = instance
            .operations()
            .map(|op| OperationFeatures {
                duration: op.duration,
                position_in_job: op.position_in_job,
                is_scheduled: false,
                is_completed: false,
                earliest_start: job_ready[op.job_id]
                    .max(machine_free[op.machine_id])
                    .saturating_sub(current_time),
            })
            .collect();

        let mut machine_remaining: Vec<usize> = instance.operations_by_machine().iter().map(Vec::len).collect();
        let mut machine_uncompleted = machine_remaining.clone();
        let mut job_remaining: Vec<usize> = instance.jobs().iter().map(Vec::len).collect();
        let mut job_uncompleted = job_remaining.clone();

        for s in schedule.scheduled_operations() {
            let op = &s.operation;
            let completed = s.end_time <= current_time;
            if let Some(f) = operations.get_mut(op.operation_id) {
                f.is_scheduled = true;
                f.is_completed = completed;
                f.earliest_start = s.start_time.saturating_sub(current_time);
            }
            machine_remaining[op.machine_id] -= 1;
            job_remaining[op.job_id] -= 1;
            if completed {
                machine_uncompleted[op.machine_id] -= 1;
                job_uncompleted[op.job_id] -= 1;
            }
        }

        let resources = |free: &[i64], remaining: &[usize], uncompleted: &[usize]| -> Vec<ResourceFeatures> {
            free.iter()
                .zip(remaining)
                .zip(uncompleted)
                .map(|((&t, &remaining_operations), &left)| ResourceFeatures {
                    earliest_start: t.saturating_sub(current_time),
                    is_completed: left == 0,
                    remaining_operations,
                })
                .collect()
        };
        let machines = resources(&machine_free, &machine_remaining, &machine_uncompleted);
        let jobs = resources(job_ready, &job_remaining, &job_uncompleted);

        debug!(
            current_time,
            scheduled = schedule.num_scheduled_operations(),
            completed = operations.iter().filter(|f| f.is_completed).count(),
            "computed node features"
        );
        Self {
            current_time,
            operations,
            machines,
            jobs,
        }
    }

    /// Feature vector of one graph node; empty for source and sink.
    pub fn node_vector(&self, node: &Node) -> Vec<f64> {
        match node.value {
            NodeValue::Operation(op) => self.operations.get(op.operation_id).map(OperationFeatures::to_vec),
            NodeValue::Machine(id) => self.machines.get(id).map(ResourceFeatures::to_vec),
            NodeValue::Job(id) => self.jobs.get(id).map(ResourceFeatures::to_vec),
            NodeValue::None => None,
        }
        .unwrap_or_default()
    }

    /// Feature vectors of every node of `graph`, indexed by node id.
    pub fn graph_vectors(&self, graph: &JobShopGraph) -> Vec<Vec<f64>> {
        graph.nodes().iter().map(|n| self.node_vector(n)).collect()
    }
}
