//! Input validation for job shop instances.
//!
//! Checks structural integrity of raw job data before an
//! [`Instance`](crate::models::Instance) is built. Detects:
//! - An empty job list
//! - Jobs without operations
//! - Non-positive durations
//! - Machine ids outside `[0, num_machines)`
//! - A machine-count override smaller than the highest referenced machine
//! - Duration and machine matrices of different shapes

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Offending job, when the problem is local to one job.
    pub job_id: Option<usize>,
    /// Offending operation position within `job_id`.
    pub position_in_job: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// The instance has no jobs at all.
    NoJobs,
    /// A job has no operations.
    EmptyJob,
    /// An operation has a zero or negative duration.
    NonPositiveDuration,
    /// An operation references a machine outside `[0, num_machines)`.
    MachineOutOfRange,
    /// The machine-count override is smaller than the inferred count.
    MachineCountTooSmall,
    /// Duration and machine matrices differ in job count or row length.
    MatrixShapeMismatch,
}

impl ValidationError {
    pub(crate) fn new(
        kind: ValidationErrorKind,
        job_id: Option<usize>,
        position_in_job: Option<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            job_id,
            position_in_job,
            message: message.into(),
        }
    }
}

/// Number of machines implied by the jobs: highest machine id + 1.
pub fn infer_num_machines(jobs: &[Vec<(usize, i64)>]) -> usize {
    jobs.iter()
        .flatten()
        .map(|&(machine_id, _)| machine_id + 1)
        .max()
        .unwrap_or(0)
}

/// Validates raw job data given as `(machine_id, duration)` pairs per job.
///
/// Checks:
/// 1. At least one job
/// 2. Every job has at least one operation
/// 3. Every duration is strictly positive
/// 4. A machine-count override is not below the inferred count
/// 5. Every machine id lies in `[0, num_machines)`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_jobs(jobs: &[Vec<(usize, i64)>], num_machines: Option<usize>) -> ValidationResult {
    let mut errors = Vec::new();

    if jobs.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoJobs,
            None,
            None,
            "Instance has no jobs",
        ));
        return Err(errors);
    }

    let inferred = infer_num_machines(jobs);
    let machine_count = num_machines.unwrap_or(inferred);
    if machine_count < inferred {
        errors.push(ValidationError::new(
            ValidationErrorKind::MachineCountTooSmall,
            None,
            None,
            format!(
                "Machine count override {machine_count} is smaller than the {inferred} machines referenced"
            ),
        ));
    }

    for (job_id, job) in jobs.iter().enumerate() {
        if job.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                Some(job_id),
                None,
                format!("Job {job_id} has no operations"),
            ));
        }

        for (position, &(machine_id, duration)) in job.iter().enumerate() {
            if duration <= 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::NonPositiveDuration,
                    Some(job_id),
                    Some(position),
                    format!(
                        "Operation {position} of job {job_id} has non-positive duration {duration}"
                    ),
                ));
            }
            if machine_id >= machine_count {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MachineOutOfRange,
                    Some(job_id),
                    Some(position),
                    format!(
                        "Operation {position} of job {job_id} references machine {machine_id}, \
                         but only {machine_count} machines exist"
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that duration and machine matrices have the same shape.
///
/// Reports a differing number of rows once, and every job whose two rows
/// differ in length.
pub fn validate_matrix_shapes(durations: &[Vec<i64>], machines: &[Vec<usize>]) -> ValidationResult {
    let mut errors = Vec::new();

    if durations.len() != machines.len() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MatrixShapeMismatch,
            None,
            None,
            format!(
                "Duration matrix has {} jobs but machine matrix has {}",
                durations.len(),
                machines.len()
            ),
        ));
    }

    for (job_id, (d_row, m_row)) in durations.iter().zip(machines).enumerate() {
        if d_row.len() != m_row.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MatrixShapeMismatch,
                Some(job_id),
                None,
                format!(
                    "Job {job_id} has {} durations but {} machines",
                    d_row.len(),
                    m_row.len()
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
