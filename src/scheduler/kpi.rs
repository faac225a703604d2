//! Schedule quality metrics (KPIs).
//!
//! Computes standard job shop performance indicators from a completed
//! schedule and its instance.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Latest completion time |
//! | Utilization | Machine busy time / makespan |
//! | Idle Time | Sum over machines of makespan - busy time |
//! | Avg Flow Time | Mean job completion time (all jobs released at t=0) |
//! | Optimality Gap | (makespan - optimum) / optimum, if an optimum is known |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::{Instance, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Latest completion time.
    pub makespan: i64,
    /// Per-machine utilization (0.0..1.0), indexed by machine id.
    pub utilization_by_machine: Vec<f64>,
    /// Mean machine utilization (0.0..1.0).
    pub avg_utilization: f64,
    /// Total idle time across machines within the makespan.
    pub total_idle_time: i64,
    /// Mean completion time over finished jobs.
    pub avg_flow_time: f64,
    /// Relative gap to the instance's known optimum.
    pub optimality_gap: Option<f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its instance.
    pub fn calculate(schedule: &Schedule, instance: &Instance) -> Self {
        let makespan = schedule.makespan();
        let num_machines = instance.num_machines();

        let utilization_by_machine: Vec<f64> = (0..num_machines)
            .map(|m| schedule.machine_utilization(m, makespan).unwrap_or(0.0))
            .collect();
        let avg_utilization = if num_machines == 0 {
            0.0
        } else {
            utilization_by_machine.iter().sum::<f64>() / num_machines as f64
        };

        let total_idle_time = (0..num_machines)
            .map(|m| makespan - schedule.machine_busy_time(m))
            .sum();

        let completions: Vec<i64> = schedule.job_completion_times().into_iter().flatten().collect();
        let avg_flow_time = if completions.is_empty() {
            0.0
        } else {
            completions.iter().sum::<i64>() as f64 / completions.len() as f64
        };

        let optimality_gap = instance
            .optimum()
            .filter(|&opt| opt > 0)
            .map(|opt| (makespan - opt) as f64 / opt as f64);

        Self {
            makespan,
            utilization_by_machine,
            avg_utilization,
            total_idle_time,
            avg_flow_time,
            optimality_gap,
        }
    }

    /// Whether the schedule is within `max_gap` of the known optimum.
    ///
    /// Always `false` when no optimum is known.
    pub fn within_gap(&self, max_gap: f64) -> bool {
        self.optimality_gap.is_some_and(|gap| gap <= max_gap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::solve;

    #[test]
    fn test_kpi_scenario_a_spt() {
        let inst = Instance::builder()
            .with_job([(0, 5), (1, 1)])
            .with_job([(0, 1), (1, 5)])
            .with_metadata("optimum", "7")
            .build()
            .unwrap();
        let schedule = solve(&inst, "shortest_processing_time", None).unwrap();
        let kpi = ScheduleKpi::calculate(&schedule, &inst);

        assert_eq!(kpi.makespan, 7);
        // M0 busy 6/7, M1 busy 6/7
        assert!((kpi.utilization_by_machine[0] - 6.0 / 7.0).abs() < 1e-10);
        assert!((kpi.avg_utilization - 6.0 / 7.0).abs() < 1e-10);
        assert_eq!(kpi.total_idle_time, 2);
        // Completions: job 0 at 7, job 1 at 6
        assert!((kpi.avg_flow_time - 6.5).abs() < 1e-10);
        assert_eq!(kpi.optimality_gap, Some(0.0));
        assert!(kpi.within_gap(0.0));
    }

    #[test]
    fn test_kpi_without_optimum() {
        let inst = Instance::from_jobs(vec![vec![(0, 5), (1, 1)], vec![(0, 1), (1, 5)]]).unwrap();
        let schedule = solve(&inst, "first_come_first_served", None).unwrap();
        let kpi = ScheduleKpi::calculate(&schedule, &inst);
        assert_eq!(kpi.makespan, 11);
        assert_eq!(kpi.optimality_gap, None);
        assert!(!kpi.within_gap(1.0));
    }

    #[test]
    fn test_kpi_empty_schedule() {
        let inst = Instance::from_jobs(vec![vec![(0, 2)]]).unwrap();
        let kpi = ScheduleKpi::calculate(&Schedule::new(&inst), &inst);
        assert_eq!(kpi.makespan, 0);
        assert_eq!(kpi.avg_utilization, 0.0);
        assert_eq!(kpi.avg_flow_time, 0.0);
    }
}
