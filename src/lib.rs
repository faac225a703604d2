//! Job shop scheduling core.
//!
//! Builds feasible job shop schedules with priority dispatching rules and
//! encodes job shop instances as graphs.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Operation`, `Instance`, `ScheduledOperation`, `Schedule`
//! - **`validation`**: Instance construction checks (empty jobs, durations, machine ids)
//! - **`dispatching`**: `DispatchingRule` trait, built-in rules, `RuleEngine`
//! - **`scheduler`**: Discrete-event dispatching solver, step-wise snapshots, KPIs
//! - **`graphs`**: Disjunctive and agent-task graph builders, residual updates, node features
//! - **`error`**: Crate-wide error type
//!
//! # Example
//!
//! ```
//! use u_jobshop::graphs::build_disjunctive_graph;
//! use u_jobshop::models::Instance;
//! use u_jobshop::scheduler::solve;
//!
//! let instance = Instance::builder()
//!     .with_name("two_by_two")
//!     .with_job([(0, 5), (1, 1)])
//!     .with_job([(0, 1), (1, 5)])
//!     .build()
//!     .unwrap();
//!
//! let schedule = solve(&instance, "shortest_processing_time", None).unwrap();
//! assert_eq!(schedule.makespan(), 7);
//!
//! let graph = build_disjunctive_graph(&instance);
//! assert_eq!(graph.num_nodes(), instance.num_operations() + 2);
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events and installs no subscriber.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"
//! - Roy & Sussmann (1964), disjunctive graph model

#![warn(missing_docs)]

pub mod dispatching;
pub mod error;
pub mod graphs;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{JobShopError, Result};
