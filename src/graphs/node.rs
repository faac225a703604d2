//! Graph nodes and edges.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Operation;

/// Dense node identifier (index into the graph's node arena).
pub type NodeId = usize;

/// Kind of entity a node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// One operation of one job.
    Operation,
    /// A machine (agent-task graphs).
    Machine,
    /// A job (agent-task graphs with job nodes).
    Job,
    /// Virtual start node of the disjunctive graph.
    Source,
    /// Virtual end node of the disjunctive graph.
    Sink,
}

impl NodeType {
    /// All node types, in a fixed order.
    pub const ALL: [NodeType; 5] = [
        NodeType::Operation,
        NodeType::Machine,
        NodeType::Job,
        NodeType::Source,
        NodeType::Sink,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            NodeType::Operation => 0,
            NodeType::Machine => 1,
            NodeType::Job => 2,
            NodeType::Source => 3,
            NodeType::Sink => 4,
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeValue {
    /// The operation an operation node stands for.
    Operation(Operation),
    /// Machine id.
    Machine(usize),
    /// Job id.
    Job(usize),
    /// Source and sink carry nothing.
    None,
}

/// A graph node.
///
/// The payload always matches the node type: operation nodes carry their
/// [`Operation`], machine and job nodes their id, source and sink nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Index in the graph's node arena.
    pub node_id: NodeId,
    /// Entity kind.
    pub node_type: NodeType,
    /// Payload matching `node_type`.
    pub value: NodeValue,
}

impl Node {
    pub(crate) fn operation(node_id: NodeId, operation: Operation) -> Self {
        Self {
            node_id,
            node_type: NodeType::Operation,
            value: NodeValue::Operation(operation),
        }
    }

    pub(crate) fn machine(node_id: NodeId, machine_id: usize) -> Self {
        Self {
            node_id,
            node_type: NodeType::Machine,
            value: NodeValue::Machine(machine_id),
        }
    }

    pub(crate) fn job(node_id: NodeId, job_id: usize) -> Self {
        Self {
            node_id,
            node_type: NodeType::Job,
            value: NodeValue::Job(job_id),
        }
    }

    pub(crate) fn terminal(node_id: NodeId, node_type: NodeType) -> Self {
        Self {
            node_id,
            node_type,
            value: NodeValue::None,
        }
    }

    /// The operation, for operation nodes.
    pub fn as_operation(&self) -> Option<&Operation> {
        match &self.value {
            NodeValue::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// The machine id, for machine nodes.
    pub fn machine_id(&self) -> Option<usize> {
        match self.value {
            NodeValue::Machine(id) => Some(id),
            _ => None,
        }
    }

    /// The job id, for job nodes.
    pub fn job_id(&self) -> Option<usize> {
        match self.value {
            NodeValue::Job(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            NodeValue::Operation(op) => write!(f, "{}: {op}", self.node_id),
            NodeValue::Machine(id) => write!(f, "{}: M{id}", self.node_id),
            NodeValue::Job(id) => write!(f, "{}: J{id}", self.node_id),
            NodeValue::None => write!(f, "{}: {:?}", self.node_id, self.node_type),
        }
    }
}

/// Kind of relation an edge encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Job precedence (disjunctive graph).
    Conjunctive,
    /// Unresolved machine sharing (disjunctive graph).
    Disjunctive,
    /// Operation to the machine that runs it.
    OperationMachine,
    /// Between two machines.
    MachineMachine,
    /// Operation to its job.
    OperationJob,
    /// Operations of the same job or on the same machine (agent-task graph).
    OperationOperation,
    /// Between two jobs.
    JobJob,
}

/// A graph edge between two node ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint (tail of a directed edge).
    pub source: NodeId,
    /// Second endpoint (head of a directed edge).
    pub target: NodeId,
    /// Relation kind.
    pub edge_type: EdgeType,
    /// Whether the edge only runs from `source` to `target`.
    pub directed: bool,
}

impl Edge {
    /// Whether the edge touches `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    /// The other endpoint, if the edge touches `node`.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_payload_accessors() {
        let op = Operation::new(1, 0, 2, 4, 3);
        let n = Node::operation(0, op);
        assert_eq!(n.as_operation(), Some(&op));
        assert_eq!(n.machine_id(), None);

        let m = Node::machine(5, 2);
        assert_eq!(m.node_type, NodeType::Machine);
        assert_eq!(m.machine_id(), Some(2));
        assert_eq!(m.to_string(), "5: M2");

        let s = Node::terminal(7, NodeType::Sink);
        assert_eq!(s.value, NodeValue::None);
        assert_eq!(s.to_string(), "7: Sink");
    }

    #[test]
    fn test_edge_endpoints() {
        let e = Edge {
            source: 1,
            target: 4,
            edge_type: EdgeType::Disjunctive,
            directed: false,
        };
        assert!(e.touches(4));
        assert_eq!(e.other(1), Some(4));
        assert_eq!(e.other(4), Some(1));
        assert_eq!(e.other(2), None);
    }

    #[test]
    fn test_node_type_index_matches_all() {
        for (i, t) in NodeType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
    }
}
