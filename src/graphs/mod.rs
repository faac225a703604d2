//! Graph representations of job shop instances.
//!
//! Structural encoders that turn an [`Instance`](crate::models::Instance)
//! into a [`JobShopGraph`]: the classic disjunctive graph and the
//! agent-task graph. Graphs are static artifacts; the residual updater is the
//! only operation that changes one after it is built, and
//! [`NodeFeatures`] annotates nodes with the state of a partial schedule.
//!
//! # Storage
//!
//! Nodes and edges are stored in arenas and addressed by dense ids assigned
//! in insertion order, so builders are deterministic and node ids are
//! reproducible across builds of the same instance.

mod agent_task;
mod disjunctive;
mod features;
mod graph;
mod node;
mod residual;

pub use agent_task::{build_agent_task_graph, build_agent_task_graph_named, AgentTaskVariant};
pub use disjunctive::build_disjunctive_graph;
pub use features::{NodeFeatures, OperationFeatures, ResourceFeatures};
pub use graph::JobShopGraph;
pub use node::{Edge, EdgeType, Node, NodeId, NodeType, NodeValue};
pub use residual::remove_completed_operations;
