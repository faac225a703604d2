//! Dispatching-rule solver and KPI evaluation.
//!
//! Provides the discrete-event dispatching solver (single-shot and
//! step-wise) and schedule quality metrics.
//!
//! # Algorithm
//!
//! `DispatchingRuleSolver` is a greedy, priority-driven simulation: the next
//! operation of every job is ready once its predecessor finishes, and when
//! ready operations contend for a machine a dispatching rule decides. It is
//! not optimal, but always produces a feasible schedule.
//!
//! # KPI
//!
//! `ScheduleKpi` computes makespan, utilization, idle time, flow time, and
//! the gap to a known optimum.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4, 7
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod kpi;
mod solver;
mod stepper;

pub use kpi::ScheduleKpi;
pub use solver::{solve, DispatchingRuleSolver};
pub use stepper::ScheduleStepper;
