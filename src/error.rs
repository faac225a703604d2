//! Error types for job shop modelling, dispatching, and graph encoding.
//!
//! Every failure in this crate is a deterministic function of its input;
//! there are no transient (I/O or network) error classes.

use thiserror::Error;

use crate::validation::ValidationError;

/// Main error type for u-jobshop operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobShopError {
    /// The instance description is malformed.
    ///
    /// Carries every detected problem, not just the first one.
    #[error("invalid instance: {}", summarize(.0))]
    InstanceValidation(Vec<ValidationError>),

    /// A dispatching rule identifier was not recognized.
    #[error("unknown dispatching rule '{0}'")]
    UnknownDispatchingRule(String),

    /// An agent-task graph variant identifier was not recognized.
    #[error("unsupported agent-task graph variant '{0}'")]
    UnsupportedVariant(String),

    /// A schedule invariant (machine exclusivity or job precedence) was broken.
    ///
    /// Produced by the solver only if its own bookkeeping is wrong, and by
    /// [`Schedule::from_machine_sequences`](crate::models::Schedule::from_machine_sequences)
    /// when importing an infeasible external schedule.
    #[error("schedule invariant violated: {0}")]
    ScheduleInvariant(String),
}

impl JobShopError {
    /// Validation errors, if this is an instance validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            JobShopError::InstanceValidation(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Result type alias for u-jobshop operations.
pub type Result<T> = std::result::Result<T, JobShopError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_display_single_validation_error() {
        let err = JobShopError::InstanceValidation(vec![ValidationError::new(
            ValidationErrorKind::EmptyJob,
            Some(1),
            None,
            "Job 1 has no operations",
        )]);
        assert_eq!(err.to_string(), "invalid instance: Job 1 has no operations");
    }

    #[test]
    fn test_display_multiple_validation_errors() {
        let err = JobShopError::InstanceValidation(vec![
            ValidationError::new(ValidationErrorKind::EmptyJob, Some(0), None, "a"),
            ValidationError::new(ValidationErrorKind::EmptyJob, Some(1), None, "b"),
            ValidationError::new(ValidationErrorKind::EmptyJob, Some(2), None, "c"),
        ]);
        assert_eq!(err.to_string(), "invalid instance: a (and 2 more)");
        assert_eq!(err.validation_errors().len(), 3);
    }

    #[test]
    fn test_other_variants() {
        let err = JobShopError::UnknownDispatchingRule("edd".into());
        assert_eq!(err.to_string(), "unknown dispatching rule 'edd'");
        assert!(err.validation_errors().is_empty());

        let err = JobShopError::UnsupportedVariant("dense".into());
        assert!(err.to_string().contains("dense"));
    }
}
