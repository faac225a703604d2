//! Disjunctive graph builder.
//!
//! # Structure
//!
//! - One operation node per operation (job-major), then a source and a sink.
//! - Conjunctive (directed) edges: source to each job's first operation, each
//!   operation to its successor, each job's last operation to the sink.
//! - Disjunctive (undirected) edges: every unordered pair of operations that
//!   share a machine. Orienting them is what a schedule decides.
//!
//! # Reference
//! Roy & Sussmann (1964), "Les problèmes d'ordonnancement avec contraintes
//! disjonctives"; Pinedo (2016), "Scheduling", Ch. 7.1

use tracing::debug;

use super::{EdgeType, JobShopGraph, NodeId, NodeType};
use crate::models::Instance;

/// Builds the disjunctive graph of `instance`.
///
/// The graph has `num_operations + 2` nodes, `num_operations + num_jobs`
/// conjunctive edges, and `C(n_m, 2)` disjunctive edges per machine `m`
/// with `n_m` operations.
///
/// # Example
/// ```
/// use u_jobshop::graphs::{build_disjunctive_graph, EdgeType};
/// use u_jobshop::models::Instance;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap();
/// let graph = build_disjunctive_graph(&instance);
/// assert_eq!(graph.num_nodes(), 6);
/// assert_eq!(graph.edge_count_by_type(EdgeType::Conjunctive), 6);
/// assert_eq!(graph.edge_count_by_type(EdgeType::Disjunctive), 2);
/// ```
pub fn build_disjunctive_graph(instance: &Instance) -> JobShopGraph {
    let mut graph = JobShopGraph::new();

    let job_nodes: Vec<Vec<NodeId>> = instance
        .jobs()
        .iter()
        .map(|job| job.iter().map(|&op| graph.add_operation_node(op)).collect())
        .collect();
    let source = graph.add_terminal_node(NodeType::Source);
    let sink = graph.add_terminal_node(NodeType::Sink);

    for chain in &job_nodes {
        let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
            continue;
        };
        graph.add_edge(source, first, EdgeType::Conjunctive, true);
        for pair in chain.windows(2) {
            graph.add_edge(pair[0], pair[1], EdgeType::Conjunctive, true);
        }
        graph.add_edge(last, sink, EdgeType::Conjunctive, true);
    }

    for machine in 0..instance.num_machines() {
        let ids = graph.nodes_by_machine(machine);
        graph.add_clique(&ids, EdgeType::Disjunctive);
    }

    debug!(
        instance = instance.name(),
        nodes = graph.num_nodes(),
        conjunctive = graph.edge_count_by_type(EdgeType::Conjunctive),
        disjunctive = graph.edge_count_by_type(EdgeType::Disjunctive),
        "built disjunctive graph"
    );
    graph
}
