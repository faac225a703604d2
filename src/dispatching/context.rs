//! Scheduling context for dispatching rule evaluation.

use crate::models::Operation;

/// Simulation state passed to dispatching rules at a decision instant.
///
/// Borrows the solver's state arrays, indexed by machine id or job id.
/// All times are in instance time units relative to t=0.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingContext<'a> {
    /// Decision instant.
    pub current_time: i64,
    /// Time each machine becomes free.
    pub machine_free_times: &'a [i64],
    /// Completion time of the last scheduled operation per job (0 if none).
    pub job_ready_times: &'a [i64],
    /// Duration sum of the unscheduled operations per job.
    pub remaining_work: &'a [i64],
    /// Number of unscheduled operations per job.
    pub remaining_operations: &'a [usize],
}

impl<'a> SchedulingContext<'a> {
    /// Creates a context over the given state arrays.
    pub fn new(
        current_time: i64,
        machine_free_times: &'a [i64],
        job_ready_times: &'a [i64],
        remaining_work: &'a [i64],
        remaining_operations: &'a [usize],
    ) -> Self {
        Self {
            current_time,
            machine_free_times,
            job_ready_times,
            remaining_work,
            remaining_operations,
        }
    }

    /// Instant the operation entered the ready set: its job's availability time.
    pub fn arrival_time(&self, operation: &Operation) -> i64 {
        self.job_ready_times
            .get(operation.job_id)
            .copied()
            .unwrap_or(0)
    }

    /// Earliest feasible start of the operation.
    pub fn earliest_start(&self, operation: &Operation) -> i64 {
        let machine_free = self
            .machine_free_times
            .get(operation.machine_id)
            .copied()
            .unwrap_or(0);
        self.arrival_time(operation).max(machine_free)
    }

    /// Remaining work of the operation's job, falling back to its own duration.
    pub fn remaining_work(&self, operation: &Operation) -> i64 {
        self.remaining_work
            .get(operation.job_id)
            .copied()
            .unwrap_or(operation.duration)
    }

    /// Remaining operation count of the operation's job, at least 1.
    pub fn remaining_operations(&self, operation: &Operation) -> usize {
        self.remaining_operations
            .get(operation.job_id)
            .copied()
            .unwrap_or(1)
    }
}
