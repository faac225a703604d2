//! Operation model.
//!
//! An operation is the smallest schedulable unit of work: one job step that
//! occupies exactly one machine for a fixed duration.

use serde::{Deserialize, Serialize};

/// A single operation of a job.
///
/// Operations are created by [`Instance`](super::Instance) construction, which
/// assigns `job_id`, `position_in_job`, and `operation_id`. Equality is
/// value-based; the pair `(job_id, position_in_job)` identifies an operation
/// within its instance.
///
/// # Time Representation
/// Durations are integer time units. Instances with fractional durations
/// should be rescaled by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    /// Owning job.
    pub job_id: usize,
    /// Position within the job (0-indexed).
    pub position_in_job: usize,
    /// Required machine.
    pub machine_id: usize,
    /// Processing time (strictly positive).
    pub duration: i64,
    /// Global index, job-major (0..num_operations).
    pub operation_id: usize,
}

impl Operation {
    pub(crate) fn new(
        job_id: usize,
        position_in_job: usize,
        machine_id: usize,
        duration: i64,
        operation_id: usize,
    ) -> Self {
        Self {
            job_id,
            position_in_job,
            machine_id,
            duration,
            operation_id,
        }
    }

    /// Identity key `(job_id, position_in_job)`.
    #[inline]
    pub fn key(&self) -> (usize, usize) {
        (self.job_id, self.position_in_job)
    }

    /// Whether this is the first operation of its job.
    #[inline]
    pub fn is_first(&self) -> bool {
        self.position_in_job == 0
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "O(m={}, d={}, j={}, p={})",
            self.machine_id, self.duration, self.job_id, self.position_in_job
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_identity() {
        let a = Operation::new(1, 2, 0, 5, 7);
        let b = Operation::new(1, 2, 0, 5, 7);
        assert_eq!(a, b);
        assert_eq!(a.key(), (1, 2));
        assert!(!a.is_first());
    }

    #[test]
    fn test_operation_display() {
        let op = Operation::new(0, 0, 3, 12, 0);
        assert_eq!(op.to_string(), "O(m=3, d=12, j=0, p=0)");
        assert!(op.is_first());
    }
}
