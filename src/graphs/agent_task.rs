//! Agent-task graph builder.
//!
//! Operations are tasks, machines are the agents that execute them. Every
//! variant connects each operation to its machine and links all machines to
//! each other; richer variants add job-centric structure.
//!
//! | Variant | Nodes | Extra edges |
//! |---------|-------|-------------|
//! | `basic` | operations, machines | none |
//! | `with_jobs` | + jobs | operation-job |
//! | `complete` | + jobs | operation-job, same-job and same-machine operation pairs, job-job |
//!
//! All edges are undirected. Nodes are inserted operations first (job-major),
//! then machines, then jobs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EdgeType, JobShopGraph, NodeId};
use crate::error::{JobShopError, Result};
use crate::models::Instance;

/// Agent-task graph flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTaskVariant {
    /// Operations and machines only.
    #[default]
    Basic,
    /// Adds explicit job nodes linked to their operations.
    WithJobs,
    /// Adds job nodes plus all-pairs operation and job links.
    Complete,
}

impl AgentTaskVariant {
    /// Every variant.
    pub const ALL: [AgentTaskVariant; 3] = [
        AgentTaskVariant::Basic,
        AgentTaskVariant::WithJobs,
        AgentTaskVariant::Complete,
    ];

    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentTaskVariant::Basic => "basic",
            AgentTaskVariant::WithJobs => "with_jobs",
            AgentTaskVariant::Complete => "complete",
        }
    }

    fn has_job_nodes(self) -> bool {
        !matches!(self, AgentTaskVariant::Basic)
    }
}

impl fmt::Display for AgentTaskVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentTaskVariant {
    type Err = JobShopError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| JobShopError::UnsupportedVariant(s.to_string()))
    }
}

/// Builds the agent-task graph of `instance`.
///
/// # Example
/// ```
/// use u_jobshop::graphs::{build_agent_task_graph, AgentTaskVariant, EdgeType, NodeType};
/// use u_jobshop::models::Instance;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (2, 5)]]).unwrap();
/// let variant: AgentTaskVariant = "basic".parse().unwrap();
/// let graph = build_agent_task_graph(&instance, variant);
/// assert_eq!(graph.nodes_by_type(NodeType::Machine).len(), 3);
/// assert_eq!(graph.edge_count_by_type(EdgeType::MachineMachine), 3);
/// assert!("mixed".parse::<AgentTaskVariant>().is_err());
/// ```
pub fn build_agent_task_graph(instance: &Instance, variant: AgentTaskVariant) -> JobShopGraph {
    let mut graph = JobShopGraph::new();

    let operation_ids: Vec<NodeId> = instance
        .operations()
        .map(|&op| graph.add_operation_node(op))
        .collect();
    let machine_ids: Vec<NodeId> = (0..instance.num_machines())
        .map(|m| graph.add_machine_node(m))
        .collect();
    let job_ids: Vec<NodeId> = if variant.has_job_nodes() {
        (0..instance.num_jobs()).map(|j| graph.add_job_node(j)).collect()
    } else {
        Vec::new()
    };

    for (&node, op) in operation_ids.iter().zip(instance.operations()) {
        graph.add_edge(node, machine_ids[op.machine_id], EdgeType::OperationMachine, false);
    }
    graph.add_clique(&machine_ids, EdgeType::MachineMachine);

    if variant.has_job_nodes() {
        for (&node, op) in operation_ids.iter().zip(instance.operations()) {
            graph.add_edge(node, job_ids[op.job_id], EdgeType::OperationJob, false);
        }
    }

    if variant == AgentTaskVariant::Complete {
        for job_id in 0..instance.num_jobs() {
            let ids = graph.nodes_by_job(job_id);
            graph.add_clique(&ids, EdgeType::OperationOperation);
        }
        for machine_id in 0..instance.num_machines() {
            let ids = graph.nodes_by_machine(machine_id);
            graph.add_clique(&ids, EdgeType::OperationOperation);
        }
        graph.add_clique(&job_ids, EdgeType::JobJob);
    }

    debug!(
        instance = instance.name(),
        variant = variant.as_str(),
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        "built agent-task graph"
    );
    graph
}

/// Parses `variant` and builds the matching agent-task graph.
///
/// # Errors
/// [`JobShopError::UnsupportedVariant`] for an unrecognized variant name.
pub fn build_agent_task_graph_named(instance: &Instance, variant: &str) -> Result<JobShopGraph> {
    Ok(build_agent_task_graph(instance, variant.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::NodeType;

    fn choose2(n: usize) -> usize {
        n * n.saturating_sub(1) / 2
    }

    fn instance() -> Instance {
        Instance::from_jobs(vec![
            vec![(0, 3), (1, 2), (2, 2)],
            vec![(0, 2), (2, 1), (1, 4)],
            vec![(1, 4), (2, 3)],
        ])
        .unwrap()
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("basic".parse::<AgentTaskVariant>().unwrap(), AgentTaskVariant::Basic);
        assert_eq!(" WITH_JOBS ".parse::<AgentTaskVariant>().unwrap(), AgentTaskVariant::WithJobs);
        assert_eq!("complete".parse::<AgentTaskVariant>().unwrap(), AgentTaskVariant::Complete);
        assert_eq!(
            "dense".parse::<AgentTaskVariant>().unwrap_err(),
            JobShopError::UnsupportedVariant("dense".into())
        );
        for v in AgentTaskVariant::ALL {
            assert_eq!(v.to_string().parse::<AgentTaskVariant>().unwrap(), v);
        }
    }

    #[test]
    fn test_basic_counts() {
        let inst = instance();
        let g = build_agent_task_graph(&inst, AgentTaskVariant::Basic);
        assert_eq!(g.nodes_by_type(NodeType::Operation).len(), inst.num_operations());
        assert_eq!(g.nodes_by_type(NodeType::Machine).len(), inst.num_machines());
        assert!(g.nodes_by_type(NodeType::Job).is_empty());
        assert_eq!(g.edge_count_by_type(EdgeType::OperationMachine), inst.num_operations());
        assert_eq!(g.edge_count_by_type(EdgeType::MachineMachine), choose2(inst.num_machines()));
        assert_eq!(g.num_edges(), inst.num_operations() + choose2(inst.num_machines()));
        assert!(g.edges().iter().all(|e| !e.directed));
    }

    #[test]
    fn test_operation_machine_edges_match_machine_id() {
        let g = build_agent_task_graph(&instance(), AgentTaskVariant::Basic);
        for e in g.edges().iter().filter(|e| e.edge_type == EdgeType::OperationMachine) {
            let op = g.node(e.source).unwrap().as_operation().unwrap();
            assert_eq!(g.node(e.target).unwrap().machine_id(), Some(op.machine_id));
        }
    }

    #[test]
    fn test_with_jobs_counts() {
        let inst = instance();
        let g = build_agent_task_graph(&inst, AgentTaskVariant::WithJobs);
        let n = inst.num_operations();
        let m = inst.num_machines();
        assert_eq!(g.nodes_by_type(NodeType::Job), (n + m..n + m + inst.num_jobs()).collect::<Vec<_>>());
        assert_eq!(g.edge_count_by_type(EdgeType::OperationJob), n);
        assert_eq!(g.edge_count_by_type(EdgeType::OperationOperation), 0);
        assert_eq!(g.job_node(2), Some(n + m + 2));
    }

    #[test]
    fn test_complete_counts() {
        let inst = instance();
        let g = build_agent_task_graph(&inst, AgentTaskVariant::Complete);
        let same_job: usize = inst.jobs().iter().map(|j| choose2(j.len())).sum();
        let same_machine: usize = inst.operations_by_machine().iter().map(|o| choose2(o.len())).sum();
        assert_eq!(g.edge_count_by_type(EdgeType::OperationOperation), same_job + same_machine);
        assert_eq!(g.edge_count_by_type(EdgeType::JobJob), choose2(inst.num_jobs()));
        assert_eq!(g.edge_count_by_type(EdgeType::OperationJob), inst.num_operations());
        assert_eq!(g.edge_count_by_type(EdgeType::MachineMachine), choose2(inst.num_machines()));
    }

    #[test]
    fn test_single_machine_has_no_machine_edges() {
        let inst = Instance::from_jobs(vec![vec![(0, 1)], vec![(0, 2)]]).unwrap();
        let g = build_agent_task_graph(&inst, AgentTaskVariant::Basic);
        assert_eq!(g.edge_count_by_type(EdgeType::MachineMachine), 0);
    }

    #[test]
    fn test_idempotent() {
        let inst = instance();
        for v in AgentTaskVariant::ALL {
            let a = build_agent_task_graph(&inst, v);
            let b = build_agent_task_graph(&inst, v);
            assert_eq!(a, b);
            for t in NodeType::ALL {
                assert_eq!(a.nodes_by_type(t), b.nodes_by_type(t));
            }
        }
    }

    #[test]
    fn test_named_builder() {
        let inst = instance();
        assert!(build_agent_task_graph_named(&inst, "complete").is_ok());
        assert!(matches!(
            build_agent_task_graph_named(&inst, "nope"),
            Err(JobShopError::UnsupportedVariant(_))
        ));
    }
}
