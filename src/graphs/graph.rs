//! Arena-backed job shop graph.
//!
//! Nodes and edges live in contiguous vectors and refer to each other by
//! dense integer ids, so type-indexed lookups are plain slice accesses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::node::{Edge, EdgeType, Node, NodeId, NodeType};
use crate::models::Operation;

/// Node and edge container with per-type node lists.
///
/// Node ids are assigned in insertion order and never reused. Apart from
/// [`remove_node`](Self::remove_node), a graph is not modified after its
/// builder returns it; removal only marks a node, keeping every id stable.
///
/// # Example
/// ```
/// use u_jobshop::graphs::{build_disjunctive_graph, NodeType};
/// use u_jobshop::models::Instance;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 3), (1, 2)], vec![(1, 2), (0, 1)]]).unwrap();
/// let graph = build_disjunctive_graph(&instance);
/// assert_eq!(graph.nodes_by_type(NodeType::Operation), &[0, 1, 2, 3]);
/// assert_eq!(graph.nodes_by_type(NodeType::Source), &[4]);
/// assert_eq!(graph.nodes_by_machine(0), vec![0, 3]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobShopGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    nodes_by_type: [Vec<NodeId>; 5],
    operation_nodes: HashMap<usize, NodeId>,
    machine_nodes: HashMap<usize, NodeId>,
    job_nodes: HashMap<usize, NodeId>,
    removed: Vec<bool>,
}

impl JobShopGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn push_node(&mut self, make: impl FnOnce(NodeId) -> Node) -> NodeId {
        let id = self.nodes.len();
        let node = make(id);
        self.nodes_by_type[node.node_type.index()].push(id);
        self.nodes.push(node);
        self.removed.push(false);
        id
    }

    pub(crate) fn add_operation_node(&mut self, operation: Operation) -> NodeId {
        let id = self.push_node(|id| Node::operation(id, operation));
        self.operation_nodes.insert(operation.operation_id, id);
        id
    }

    pub(crate) fn add_machine_node(&mut self, machine_id: usize) -> NodeId {
        let id = self.push_node(|id| Node::machine(id, machine_id));
        self.machine_nodes.insert(machine_id, id);
        id
    }

    pub(crate) fn add_job_node(&mut self, job_id: usize) -> NodeId {
        let id = self.push_node(|id| Node::job(id, job_id));
        self.job_nodes.insert(job_id, id);
        id
    }

    pub(crate) fn add_terminal_node(&mut self, node_type: NodeType) -> NodeId {
        self.push_node(|id| Node::terminal(id, node_type))
    }

    pub(crate) fn add_edge(&mut self, source: NodeId, target: NodeId, edge_type: EdgeType, directed: bool) {
        self.edges.push(Edge {
            source,
            target,
            edge_type,
            directed,
        });
    }

    /// Adds an undirected edge between every unordered pair of `ids`.
    pub(crate) fn add_clique(&mut self, ids: &[NodeId], edge_type: EdgeType) {
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                self.add_edge(a, b, edge_type, false);
            }
        }
    }

    /// All nodes, removed ones included, indexed by id.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, including those touching removed nodes.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of nodes, removed ones included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges, including those touching removed nodes.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Ids of the nodes of one type, in insertion order.
    pub fn nodes_by_type(&self, node_type: NodeType) -> &[NodeId] {
        &self.nodes_by_type[node_type.index()]
    }

    /// Node id of the operation with the given global `operation_id`.
    pub fn operation_node(&self, operation_id: usize) -> Option<NodeId> {
        self.operation_nodes.get(&operation_id).copied()
    }

    /// Node id of a machine, if machine nodes are modeled.
    pub fn machine_node(&self, machine_id: usize) -> Option<NodeId> {
        self.machine_nodes.get(&machine_id).copied()
    }

    /// Node id of a job, if job nodes are modeled.
    pub fn job_node(&self, job_id: usize) -> Option<NodeId> {
        self.job_nodes.get(&job_id).copied()
    }

    /// Operation node ids on a machine, in insertion order.
    pub fn nodes_by_machine(&self, machine_id: usize) -> Vec<NodeId> {
        self.operation_nodes_where(|op| op.machine_id == machine_id)
    }

    /// Operation node ids of a job, in insertion order.
    pub fn nodes_by_job(&self, job_id: usize) -> Vec<NodeId> {
        self.operation_nodes_where(|op| op.job_id == job_id)
    }

    fn operation_nodes_where(&self, pred: impl Fn(&Operation) -> bool) -> Vec<NodeId> {
        self.nodes_by_type(NodeType::Operation)
            .iter()
            .copied()
            .filter(|&id| self.nodes[id].as_operation().is_some_and(&pred))
            .collect()
    }

    /// Number of edges of one type.
    pub fn edge_count_by_type(&self, edge_type: EdgeType) -> usize {
        self.edges.iter().filter(|e| e.edge_type == edge_type).count()
    }

    /// Marks a node as removed. Returns `false` if it was already removed or
    /// does not exist.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        match self.removed.get_mut(id) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    /// Whether a node was removed. Unknown ids count as removed.
    pub fn is_removed(&self, id: NodeId) -> bool {
        self.removed.get(id).copied().unwrap_or(true)
    }

    /// Nodes that have not been removed.
    pub fn active_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| !self.removed[n.node_id])
    }

    /// Edges whose endpoints are both still present.
    pub fn active_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .iter()
            .filter(|e| !self.is_removed(e.source) && !self.is_removed(e.target))
    }

    /// Ids adjacent to `id` over active edges, ignoring direction.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_removed(id) {
            return Vec::new();
        }
        self.active_edges().filter_map(|e| e.other(id)).collect()
    }

    /// Successors of `id` over active directed edges.
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.active_edges()
            .filter(|e| e.directed && e.source == id)
            .map(|e| e.target)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Instance;

    fn two_op_graph() -> JobShopGraph {
        let inst = Instance::from_jobs(vec![vec![(0, 2), (1, 3)]]).unwrap();
        let mut g = JobShopGraph::new();
        let a = g.add_operation_node(inst.jobs()[0][0]);
        let b = g.add_operation_node(inst.jobs()[0][1]);
        let m = g.add_machine_node(0);
        g.add_edge(a, b, EdgeType::Conjunctive, true);
        g.add_edge(a, m, EdgeType::OperationMachine, false);
        g
    }

    #[test]
    fn test_ids_follow_insertion_order() {
        let g = two_op_graph();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.nodes_by_type(NodeType::Operation), &[0, 1]);
        assert_eq!(g.nodes_by_type(NodeType::Machine), &[2]);
        assert!(g.nodes_by_type(NodeType::Job).is_empty());
        for (i, n) in g.nodes().iter().enumerate() {
            assert_eq!(n.node_id, i);
        }
        assert_eq!(g.operation_node(1), Some(1));
        assert_eq!(g.machine_node(0), Some(2));
        assert_eq!(g.job_node(0), None);
    }

    #[test]
    fn test_lookups_by_machine_and_job() {
        let g = two_op_graph();
        assert_eq!(g.nodes_by_machine(1), vec![1]);
        assert_eq!(g.nodes_by_job(0), vec![0, 1]);
        assert_eq!(g.edge_count_by_type(EdgeType::Conjunctive), 1);
    }

    #[test]
    fn test_neighbors_and_successors() {
        let g = two_op_graph();
        let mut n = g.neighbors(0);
        n.sort_unstable();
        assert_eq!(n, vec![1, 2]);
        assert_eq!(g.successors(0), vec![1]);
        assert!(g.successors(1).is_empty());
    }

    #[test]
    fn test_remove_node() {
        let mut g = two_op_graph();
        assert!(g.remove_node(0));
        assert!(!g.remove_node(0));
        assert!(!g.remove_node(99));
        assert!(g.is_removed(0));
        assert_eq!(g.active_edges().count(), 0);
        assert_eq!(g.active_nodes().count(), 2);
        assert!(g.neighbors(0).is_empty());
        // ids are stable
        assert_eq!(g.node(1).unwrap().node_id, 1);
    }

    #[test]
    fn test_clique() {
        let mut g = JobShopGraph::new();
        let ids: Vec<NodeId> = (0..4).map(|m| g.add_machine_node(m)).collect();
        g.add_clique(&ids, EdgeType::MachineMachine);
        assert_eq!(g.num_edges(), 6);
        assert!(g.edges().iter().all(|e| !e.directed));
    }
}
