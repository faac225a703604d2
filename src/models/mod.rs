//! Job shop domain models.
//!
//! Provides the core data types for representing job shop scheduling
//! problems and their solutions.
//!
//! # Terminology
//!
//! | Type | Meaning |
//! |------|---------|
//! | Operation | One job step: a machine and a duration |
//! | Instance | Jobs (ordered operations), machine count, metadata |
//! | ScheduledOperation | An operation with start and end time |
//! | Schedule | Per-machine ordered scheduled operations |

mod instance;
mod operation;
mod schedule;

pub use instance::{Instance, InstanceBuilder, DEFAULT_INSTANCE_NAME, OPTIMUM_KEY};
pub use operation::Operation;
pub use schedule::{Schedule, ScheduledOperation};
