//! Residual graph updates.
//!
//! Shrinks a graph to the part of the problem still open at a given time:
//! completed operations disappear, and so do machines and jobs with nothing
//! left to do.

use tracing::debug;

use super::{JobShopGraph, NodeId, NodeType};
use crate::models::Schedule;

/// Removes every node that is finished at `current_time`.
///
/// 1. Operation nodes whose scheduled end is `<= current_time`.
/// 2. Machine nodes whose operations in the graph are all removed.
/// 3. Job nodes whose operations in the graph are all removed.
///
/// A machine or job without any operation node (an idle machine added by a
/// machine-count override, or a graph without operation nodes) is never
/// finished and stays in the graph.
///
/// Source and sink nodes are kept. Returns the number of nodes removed by
/// this call; calling it again with the same arguments removes nothing.
///
/// # Example
/// ```
/// use u_jobshop::graphs::{build_agent_task_graph, remove_completed_operations, AgentTaskVariant};
/// use u_jobshop::models::Instance;
/// use u_jobshop::scheduler::solve;
///
/// let instance = Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap();
/// let schedule = solve(&instance, "shortest_processing_time", None).unwrap();
/// let mut graph = build_agent_task_graph(&instance, AgentTaskVariant::WithJobs);
///
/// // At t=1 only job 1's first operation has finished.
/// assert_eq!(remove_completed_operations(&mut graph, &schedule, 1), 1);
/// assert!(graph.is_removed(graph.operation_node(2).unwrap()));
/// ```
pub fn remove_completed_operations(graph: &mut JobShopGraph, schedule: &Schedule, current_time: i64) -> usize {
    let mut removed = 0;

    for s in schedule.scheduled_operations() {
        if s.end_time > current_time {
            continue;
        }
        if let Some(id) = graph.operation_node(s.operation.operation_id) {
            removed += usize::from(graph.remove_node(id));
        }
    }

    let finished_machines: Vec<usize> = graph
        .nodes_by_type(NodeType::Machine)
        .iter()
        .filter_map(|&id| graph.node(id).and_then(|n| n.machine_id()))
        .filter(|&m| all_removed(graph, &graph.nodes_by_machine(m)))
        .collect();
    for m in finished_machines {
        if let Some(id) = graph.machine_node(m) {
            removed += usize::from(graph.remove_node(id));
        }
    }

    let finished_jobs: Vec<usize> = graph
        .nodes_by_type(NodeType::Job)
        .iter()
        .filter_map(|&id| graph.node(id).and_then(|n| n.job_id()))
        .filter(|&j| all_removed(graph, &graph.nodes_by_job(j)))
        .collect();
    for j in finished_jobs {
        if let Some(id) = graph.job_node(j) {
            removed += usize::from(graph.remove_node(id));
        }
    }

    debug!(
        current_time,
        removed,
        active_nodes = graph.active_nodes().count(),
        "updated residual graph"
    );
    removed
}

/// Whether `ops` is non-empty and every node in it is removed.
fn all_removed(graph: &JobShopGraph, ops: &[NodeId]) -> bool {
    !ops.is_empty() && ops.iter().all(|&op| graph.is_removed(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::{build_agent_task_graph, build_disjunctive_graph, AgentTaskVariant, EdgeType};
    use crate::models::Instance;
    use crate::scheduler::solve;

    fn scenario_a() -> Instance {
        Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap()
    }

    #[test]
    fn test_nothing_removed_at_time_zero() {
        let inst = scenario_a();
        let schedule = solve(&inst, "spt", None).unwrap();
        let mut g = build_agent_task_graph(&inst, AgentTaskVariant::WithJobs);
        assert_eq!(remove_completed_operations(&mut g, &schedule, 0), 0);
        assert_eq!(g.active_nodes().count(), g.num_nodes());
    }

    #[test]
    fn test_completed_job_node_removed() {
        // SPT: job 1 runs M0 [0,1) then M1 [1,6); job 0 runs M0 [1,6) then M1 [6,7).
        let inst = scenario_a();
        let schedule = solve(&inst, "spt", None).unwrap();
        let mut g = build_agent_task_graph(&inst, AgentTaskVariant::WithJobs);

        // Job 1 done, job 0's first op done, so M0 is done too.
        assert_eq!(remove_completed_operations(&mut g, &schedule, 6), 5);
        assert!(g.is_removed(g.job_node(1).unwrap()));
        assert!(!g.is_removed(g.job_node(0).unwrap()));
        assert!(g.is_removed(g.machine_node(0).unwrap()));
        assert!(!g.is_removed(g.machine_node(1).unwrap()));
        assert_eq!(g.active_edges().filter(|e| e.edge_type == EdgeType::OperationJob).count(), 1);

        // Idempotent for the same time.
        assert_eq!(remove_completed_operations(&mut g, &schedule, 6), 0);

        assert_eq!(remove_completed_operations(&mut g, &schedule, 7), 3);
        assert_eq!(g.active_nodes().count(), 0);
    }

    #[test]
    fn test_idle_machines_are_kept() {
        let inst = Instance::builder()
            .with_job([(0, 2)])
            .with_num_machines(3)
            .build()
            .unwrap();
        let schedule = solve(&inst, "spt", None).unwrap();
        let mut g = build_agent_task_graph(&inst, AgentTaskVariant::Basic);
        assert_eq!(remove_completed_operations(&mut g, &schedule, 0), 0);

        // Job done: its operation and M0 go, M1 and M2 never had work.
        assert_eq!(remove_completed_operations(&mut g, &schedule, 2), 2);
        assert!(g.is_removed(g.machine_node(0).unwrap()));
        assert!(!g.is_removed(g.machine_node(1).unwrap()));
        assert!(!g.is_removed(g.machine_node(2).unwrap()));
        assert_eq!(g.edge_count_by_type(EdgeType::MachineMachine), 3);
        assert_eq!(g.active_edges().count(), 1);
    }

    #[test]
    fn test_disjunctive_keeps_terminals() {
        let inst = scenario_a();
        let schedule = solve(&inst, "fcfs", None).unwrap();
        let mut g = build_disjunctive_graph(&inst);
        remove_completed_operations(&mut g, &schedule, schedule.makespan());
        let active: Vec<NodeType> = g.active_nodes().map(|n| n.node_type).collect();
        assert_eq!(active, vec![NodeType::Source, NodeType::Sink]);
        assert_eq!(g.active_edges().count(), 0);
    }
}
