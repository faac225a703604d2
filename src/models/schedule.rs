//! Schedule (solution) model.
//!
//! A schedule assigns start times to operations, kept as one ordered
//! sequence per machine. It is built incrementally by the solver, one
//! assignment at a time, and every assignment is checked against machine
//! exclusivity and job precedence as it is appended.
//!
//! Imported schedules, whether from an external solver or from serialized
//! data, are replayed through the same checks, so a `Schedule` value always
//! satisfies its invariants.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};

use super::{Instance, Operation};
use crate::error::{JobShopError, Result};

/// An operation placed in time: `end_time = start_time + duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// The scheduled operation.
    pub operation: Operation,
    /// Start time.
    pub start_time: i64,
    /// End time.
    pub end_time: i64,
}

impl ScheduledOperation {
    /// Places `operation` at `start_time`.
    ///
    /// The end time saturates at `i64::MAX`; such a value is rejected when it
    /// is added to a [`Schedule`].
    pub fn new(operation: Operation, start_time: i64) -> Self {
        Self {
            operation,
            start_time,
            end_time: start_time.saturating_add(operation.duration),
        }
    }

    /// Machine the operation runs on.
    #[inline]
    pub fn machine_id(&self) -> usize {
        self.operation.machine_id
    }

    /// Owning job.
    #[inline]
    pub fn job_id(&self) -> usize {
        self.operation.job_id
    }
}

/// A (possibly partial) schedule for one instance.
///
/// Invariants, enforced on every append:
/// - per machine, operations are sorted by start time and do not overlap;
/// - per job, operation `k + 1` starts no earlier than operation `k` ends,
///   and operations are appended in job order.
///
/// The serialized form holds the machine sequences and the job lengths;
/// deserialization replays them and fails on any violated invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleData", into = "ScheduleData")]
pub struct Schedule {
    machine_schedules: Vec<Vec<ScheduledOperation>>,
    /// End time of the last scheduled operation per job.
    job_ready_times: Vec<i64>,
    /// Number of scheduled operations per job.
    job_progress: Vec<usize>,
    /// Number of operations per job in the instance.
    job_lengths: Vec<usize>,
}

impl Schedule {
    /// Creates an empty schedule shaped for `instance`.
    pub fn new(instance: &Instance) -> Self {
        Self {
            machine_schedules: vec![Vec::new(); instance.num_machines()],
            job_ready_times: vec![0; instance.num_jobs()],
            job_progress: vec![0; instance.num_jobs()],
            job_lengths: instance.jobs().iter().map(Vec::len).collect(),
        }
    }

    /// Imports an externally produced schedule (e.g. from an exact solver).
    ///
    /// Operations of each machine may be given in any order; they are sorted
    /// by start time and replayed in global start order, so every invariant is
    /// checked exactly as for solver-built schedules.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`] if an operation does not belong to
    /// `instance`, sits on the wrong machine, has an inconsistent end time,
    /// overlaps, or breaks job precedence.
    pub fn from_machine_sequences(
        instance: &Instance,
        machine_sequences: Vec<Vec<ScheduledOperation>>,
    ) -> Result<Self> {
        if machine_sequences.len() > instance.num_machines() {
            return Err(JobShopError::ScheduleInvariant(format!(
                "{} machine sequences given for {} machines",
                machine_sequences.len(),
                instance.num_machines()
            )));
        }
        Self::new(instance).replay(machine_sequences, Some(instance))
    }

    /// Replays `machine_sequences` into this (empty) schedule in global
    /// start order. With an instance, every operation must belong to it.
    fn replay(
        mut self,
        machine_sequences: Vec<Vec<ScheduledOperation>>,
        instance: Option<&Instance>,
    ) -> Result<Self> {
        let mut all: Vec<ScheduledOperation> = Vec::new();
        for (machine_id, sequence) in machine_sequences.into_iter().enumerate() {
            for scheduled in sequence {
                if let Some(instance) = instance {
                    if instance.operation(scheduled.job_id(), scheduled.operation.position_in_job)
                        != Some(&scheduled.operation)
                    {
                        return Err(JobShopError::ScheduleInvariant(format!(
                            "{} is not an operation of instance '{}'",
                            scheduled.operation,
                            instance.name()
                        )));
                    }
                }
                if scheduled.machine_id() != machine_id {
                    return Err(JobShopError::ScheduleInvariant(format!(
                        "{} listed on machine {machine_id}",
                        scheduled.operation
                    )));
                }
                if scheduled.operation.duration <= 0 || scheduled.start_time < 0 {
                    return Err(JobShopError::ScheduleInvariant(format!(
                        "{} starts at {} with non-positive duration or negative start",
                        scheduled.operation, scheduled.start_time
                    )));
                }
                if scheduled.start_time.checked_add(scheduled.operation.duration) != Some(scheduled.end_time) {
                    return Err(JobShopError::ScheduleInvariant(format!(
                        "{} has end time {} but starts at {}",
                        scheduled.operation, scheduled.end_time, scheduled.start_time
                    )));
                }
                all.push(scheduled);
            }
        }

        all.sort_by_key(|s| (s.start_time, s.job_id(), s.operation.position_in_job));
        for scheduled in all {
            self.dispatch(scheduled.operation, scheduled.start_time)?;
        }
        Ok(self)
    }

    /// Appends `operation` at `start_time` and returns the placement.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`] if the operation is not the next one
    /// of its job, starts before its job predecessor ends, overlaps the last
    /// operation on its machine, or ends beyond the representable time range.
    pub(crate) fn dispatch(&mut self, operation: Operation, start_time: i64) -> Result<ScheduledOperation> {
        let job_id = operation.job_id;
        let (expected, length) = match (self.job_progress.get(job_id), self.job_lengths.get(job_id)) {
            (Some(&expected), Some(&length)) => (expected, length),
            _ => {
                return Err(JobShopError::ScheduleInvariant(format!(
                    "{operation} belongs to an unknown job"
                )))
            }
        };
        if expected >= length {
            return Err(JobShopError::ScheduleInvariant(format!(
                "{operation} scheduled after its job of {length} operations is complete"
            )));
        }
        if operation.position_in_job != expected {
            return Err(JobShopError::ScheduleInvariant(format!(
                "{operation} scheduled out of job order (expected position {expected})"
            )));
        }
        if start_time < self.job_ready_times[job_id] {
            return Err(JobShopError::ScheduleInvariant(format!(
                "{operation} starts at {start_time} before its predecessor ends at {}",
                self.job_ready_times[job_id]
            )));
        }
        let end_time = start_time.checked_add(operation.duration).ok_or_else(|| {
            JobShopError::ScheduleInvariant(format!("{operation} starting at {start_time} ends after i64::MAX"))
        })?;

        let machine = self
            .machine_schedules
            .get_mut(operation.machine_id)
            .ok_or_else(|| {
                JobShopError::ScheduleInvariant(format!("{operation} uses an unknown machine"))
            })?;
        if let Some(last) = machine.last() {
            if start_time < last.end_time {
                return Err(JobShopError::ScheduleInvariant(format!(
                    "{operation} starts at {start_time} while machine {} is busy until {}",
                    operation.machine_id, last.end_time
                )));
            }
        }

        let scheduled = ScheduledOperation {
            operation,
            start_time,
            end_time,
        };
        machine.push(scheduled);
        self.job_ready_times[job_id] = end_time;
        self.job_progress[job_id] += 1;
        Ok(scheduled)
    }

    /// Ordered operations of one machine.
    pub fn machine_sequence(&self, machine_id: usize) -> &[ScheduledOperation] {
        self.machine_schedules
            .get(machine_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All machine sequences, indexed by machine id.
    pub fn machine_sequences(&self) -> &[Vec<ScheduledOperation>] {
        &self.machine_schedules
    }

    /// Iterates every scheduled operation, machine by machine.
    pub fn scheduled_operations(&self) -> impl Iterator<Item = &ScheduledOperation> + '_ {
        self.machine_schedules.iter().flatten()
    }

    /// Scheduled operations of one job, in job order.
    pub fn job_sequence(&self, job_id: usize) -> Vec<ScheduledOperation> {
        let mut ops: Vec<ScheduledOperation> = self
            .scheduled_operations()
            .filter(|s| s.job_id() == job_id)
            .copied()
            .collect();
        ops.sort_by_key(|s| s.operation.position_in_job);
        ops
    }

    /// Makespan: latest end time (0 when empty).
    pub fn makespan(&self) -> i64 {
        self.machine_schedules
            .iter()
            .filter_map(|m| m.last())
            .map(|s| s.end_time)
            .max()
            .unwrap_or(0)
    }

    /// Completion time of a job, if all its operations are scheduled.
    pub fn job_completion_time(&self, job_id: usize) -> Option<i64> {
        let done = self.job_progress.get(job_id)? == self.job_lengths.get(job_id)?;
        done.then(|| self.job_ready_times[job_id])
    }

    /// Completion time per job (`None` for unfinished jobs).
    pub fn job_completion_times(&self) -> Vec<Option<i64>> {
        (0..self.job_lengths.len())
            .map(|j| self.job_completion_time(j))
            .collect()
    }

    /// End time of the last scheduled operation per job (0 if none).
    pub fn job_ready_times(&self) -> &[i64] {
        &self.job_ready_times
    }

    /// Number of scheduled operations.
    pub fn num_scheduled_operations(&self) -> usize {
        self.job_progress.iter().sum()
    }

    /// Whether every operation of the instance is scheduled.
    pub fn is_complete(&self) -> bool {
        self.job_progress == self.job_lengths
    }

    /// Busy time of a machine.
    pub fn machine_busy_time(&self, machine_id: usize) -> i64 {
        self.machine_sequence(machine_id)
            .iter()
            .map(|s| s.operation.duration)
            .sum()
    }

    /// Busy time / horizon for a machine. `None` if `horizon` is not positive.
    pub fn machine_utilization(&self, machine_id: usize, horizon: i64) -> Option<f64> {
        if horizon <= 0 {
            return None;
        }
        Some(self.machine_busy_time(machine_id) as f64 / horizon as f64)
    }

    /// Re-checks every invariant from scratch.
    ///
    /// # Errors
    /// [`JobShopError::ScheduleInvariant`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        for (machine_id, sequence) in self.machine_schedules.iter().enumerate() {
            for pair in sequence.windows(2) {
                if pair[1].start_time < pair[0].end_time {
                    return Err(JobShopError::ScheduleInvariant(format!(
                        "{} and {} overlap on machine {machine_id}",
                        pair[0].operation, pair[1].operation
                    )));
                }
            }
            if let Some(s) = sequence.iter().find(|s| s.machine_id() != machine_id) {
                return Err(JobShopError::ScheduleInvariant(format!(
                    "{} listed on machine {machine_id}",
                    s.operation
                )));
            }
        }

        for job_id in 0..self.job_lengths.len() {
            let sequence = self.job_sequence(job_id);
            for pair in sequence.windows(2) {
                if pair[1].start_time < pair[0].end_time {
                    return Err(JobShopError::ScheduleInvariant(format!(
                        "{} starts before {} ends",
                        pair[1].operation, pair[0].operation
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Serialized form of a [`Schedule`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduleData {
    machine_schedules: Vec<Vec<ScheduledOperation>>,
    job_lengths: Vec<usize>,
}

impl From<Schedule> for ScheduleData {
    fn from(schedule: Schedule) -> Self {
        Self {
            machine_schedules: schedule.machine_schedules,
            job_lengths: schedule.job_lengths,
        }
    }
}

impl TryFrom<ScheduleData> for Schedule {
    type Error = JobShopError;

    fn try_from(data: ScheduleData) -> Result<Self> {
        let num_jobs = data.job_lengths.len();
        let empty = Self {
            machine_schedules: vec![Vec::new(); data.machine_schedules.len()],
            job_ready_times: vec![0; num_jobs],
            job_progress: vec![0; num_jobs],
            job_lengths: data.job_lengths,
        };
        empty.replay(data.machine_schedules, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> Instance {
        Instance::from_jobs(vec![vec![(0, 3), (1, 2)], vec![(1, 2), (0, 1)]]).unwrap()
    }

    fn op(inst: &Instance, job: usize, pos: usize) -> Operation {
        *inst.operation(job, pos).unwrap()
    }

    fn sample_schedule(inst: &Instance) -> Schedule {
        let mut s = Schedule::new(inst);
        s.dispatch(op(inst, 0, 0), 0).unwrap();
        s.dispatch(op(inst, 1, 0), 0).unwrap();
        s.dispatch(op(inst, 0, 1), 3).unwrap();
        s.dispatch(op(inst, 1, 1), 3).unwrap();
        s
    }

    #[test]
    fn test_schedule_makespan_and_completion() {
        let inst = sample_instance();
        let s = sample_schedule(&inst);
        assert_eq!(s.makespan(), 5);
        assert!(s.is_complete());
        assert_eq!(s.num_scheduled_operations(), 4);
        assert_eq!(s.job_completion_times(), vec![Some(5), Some(4)]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_machine_sequence_order() {
        let inst = sample_instance();
        let s = sample_schedule(&inst);
        let m0: Vec<(usize, i64, i64)> = s
            .machine_sequence(0)
            .iter()
            .map(|x| (x.job_id(), x.start_time, x.end_time))
            .collect();
        assert_eq!(m0, vec![(0, 0, 3), (1, 3, 4)]);
        assert!(s.machine_sequence(7).is_empty());
    }

    #[test]
    fn test_empty_schedule() {
        let inst = sample_instance();
        let s = Schedule::new(&inst);
        assert_eq!(s.makespan(), 0);
        assert!(!s.is_complete());
        assert_eq!(s.job_completion_times(), vec![None, None]);
        assert_eq!(s.scheduled_operations().count(), 0);
    }

    #[test]
    fn test_rejects_machine_overlap() {
        let inst = sample_instance();
        let mut s = Schedule::new(&inst);
        s.dispatch(op(&inst, 0, 0), 0).unwrap();
        // Job 1 op 1 needs M0 but job 1 op 0 must come first.
        assert!(s.dispatch(op(&inst, 1, 1), 3).is_err());
        s.dispatch(op(&inst, 1, 0), 0).unwrap();
        let err = s.dispatch(op(&inst, 1, 1), 2).unwrap_err();
        assert!(matches!(err, JobShopError::ScheduleInvariant(_)));
    }

    #[test]
    fn test_rejects_precedence_violation() {
        let inst = sample_instance();
        let mut s = Schedule::new(&inst);
        s.dispatch(op(&inst, 0, 0), 0).unwrap();
        assert!(s.dispatch(op(&inst, 0, 1), 2).is_err());
        assert_eq!(s.num_scheduled_operations(), 1);
    }

    #[test]
    fn test_utilization() {
        let inst = sample_instance();
        let s = sample_schedule(&inst);
        assert_eq!(s.machine_busy_time(0), 4);
        let util = s.machine_utilization(1, 5).unwrap();
        assert!((util - 0.8).abs() < 1e-10);
        assert!(s.machine_utilization(1, 0).is_none());
    }

    #[test]
    fn test_from_machine_sequences() {
        let inst = sample_instance();
        let built = sample_schedule(&inst);
        let mut sequences = built.machine_sequences().to_vec();
        sequences[0].reverse();

        let imported = Schedule::from_machine_sequences(&inst, sequences).unwrap();
        assert_eq!(imported, built);
    }

    #[test]
    fn test_from_machine_sequences_rejects_overlap() {
        let inst = sample_instance();
        let sequences = vec![
            vec![
                ScheduledOperation::new(op(&inst, 0, 0), 0),
                ScheduledOperation::new(op(&inst, 1, 1), 1),
            ],
            vec![
                ScheduledOperation::new(op(&inst, 1, 0), 0),
                ScheduledOperation::new(op(&inst, 0, 1), 3),
            ],
        ];
        assert!(Schedule::from_machine_sequences(&inst, sequences).is_err());
    }

    #[test]
    fn test_from_machine_sequences_rejects_wrong_machine() {
        let inst = sample_instance();
        let sequences = vec![vec![], vec![ScheduledOperation::new(op(&inst, 0, 0), 0)]];
        assert!(Schedule::from_machine_sequences(&inst, sequences).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let inst = sample_instance();
        let s = sample_schedule(&inst);
        let json = serde_json::to_string(&s).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn test_deserialize_rejects_inconsistent_bookkeeping() {
        let json = r#"{"machine_schedules":[[]],"job_ready_times":[],"job_progress":[1],"job_lengths":[1]}"#;
        assert!(serde_json::from_str::<Schedule>(json).is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_job_and_overlap() {
        let inst = sample_instance();
        let mut data = serde_json::to_value(sample_schedule(&inst)).unwrap();
        data["job_lengths"] = serde_json::json!([2]);
        assert!(serde_json::from_value::<Schedule>(data).is_err());

        let overlapping = vec![
            vec![
                ScheduledOperation::new(op(&inst, 0, 0), 0),
                ScheduledOperation::new(op(&inst, 1, 1), 1),
            ],
            vec![ScheduledOperation::new(op(&inst, 1, 0), 0)],
        ];
        let json = serde_json::json!({ "machine_schedules": overlapping, "job_lengths": [2, 2] });
        assert!(serde_json::from_value::<Schedule>(json).is_err());
    }

    #[test]
    fn test_deserialized_schedule_is_queryable() {
        let inst = sample_instance();
        let partial = {
            let mut s = Schedule::new(&inst);
            s.dispatch(op(&inst, 1, 0), 0).unwrap();
            s
        };
        let json = serde_json::to_string(&partial).unwrap();
        let back: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_completion_times(), vec![None, None]);
        assert_eq!(back.job_ready_times(), &[0, 2]);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_end_time_overflow_is_rejected() {
        let inst = sample_instance();
        let mut s = Schedule::new(&inst);
        let err = s.dispatch(op(&inst, 0, 0), i64::MAX - 1).unwrap_err();
        assert!(matches!(err, JobShopError::ScheduleInvariant(_)));
        assert_eq!(s.num_scheduled_operations(), 0);

        let far = ScheduledOperation::new(op(&inst, 0, 0), i64::MAX - 1);
        assert_eq!(far.end_time, i64::MAX);
        let sequences = vec![vec![far], vec![]];
        assert!(Schedule::from_machine_sequences(&inst, sequences).is_err());
    }

    #[test]
    fn test_rejects_operation_past_job_length() {
        let inst = sample_instance();
        let mut s = sample_schedule(&inst);
        let mut extra = op(&inst, 0, 1);
        extra.position_in_job = 2;
        assert!(s.dispatch(extra, 10).is_err());
    }
}
