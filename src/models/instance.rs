//! Job shop instance model.
//!
//! An instance is the immutable problem description: jobs (ordered operation
//! lists), the machine count, a name, and free-form metadata such as a known
//! optimum. Instances can only be obtained through validated construction.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 7 (Job Shops)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Operation;
use crate::error::{JobShopError, Result};
use crate::validation::{infer_num_machines, validate_jobs, validate_matrix_shapes};

/// Default instance name.
pub const DEFAULT_INSTANCE_NAME: &str = "JobShopInstance";

/// Metadata key holding the best known makespan.
pub const OPTIMUM_KEY: &str = "optimum";

/// A validated job shop scheduling instance.
///
/// # Example
/// ```
/// use u_jobshop::models::Instance;
///
/// let instance = Instance::builder()
///     .with_name("tiny")
///     .with_job([(0, 3), (1, 2)])
///     .with_job([(1, 2), (0, 1)])
///     .with_metadata("optimum", "5")
///     .build()
///     .unwrap();
///
/// assert_eq!(instance.num_jobs(), 2);
/// assert_eq!(instance.num_machines(), 2);
/// assert_eq!(instance.optimum(), Some(5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InstanceBuilder", into = "InstanceBuilder")]
pub struct Instance {
    jobs: Vec<Vec<Operation>>,
    num_machines: usize,
    name: String,
    metadata: HashMap<String, String>,
}

/// Unvalidated instance description.
///
/// Collects jobs as `(machine_id, duration)` pairs plus optional name,
/// machine-count override, and metadata. [`build`](Self::build) validates
/// everything at once. This is also the serialized form of [`Instance`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceBuilder {
    /// Instance name. `None` = [`DEFAULT_INSTANCE_NAME`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Jobs as ordered `(machine_id, duration)` pairs.
    pub jobs: Vec<Vec<(usize, i64)>>,
    /// Explicit machine count. `None` = inferred (max machine id + 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_machines: Option<usize>,
    /// Auxiliary key-value facts.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl InstanceBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a job given as `(machine_id, duration)` pairs.
    pub fn with_job(mut self, operations: impl IntoIterator<Item = (usize, i64)>) -> Self {
        self.jobs.push(operations.into_iter().collect());
        self
    }

    /// Appends several jobs.
    pub fn with_jobs<J>(mut self, jobs: impl IntoIterator<Item = J>) -> Self
    where
        J: IntoIterator<Item = (usize, i64)>,
    {
        self.jobs
            .extend(jobs.into_iter().map(|job| job.into_iter().collect()));
        self
    }

    /// Overrides the inferred machine count.
    pub fn with_num_machines(mut self, num_machines: usize) -> Self {
        self.num_machines = Some(num_machines);
        self
    }

    /// Adds a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Validates the description and builds the instance.
    ///
    /// # Errors
    /// [`JobShopError::InstanceValidation`] listing every violated invariant.
    pub fn build(self) -> Result<Instance> {
        validate_jobs(&self.jobs, self.num_machines).map_err(JobShopError::InstanceValidation)?;

        let num_machines = self
            .num_machines
            .unwrap_or_else(|| infer_num_machines(&self.jobs));

        let mut operation_id = 0;
        let jobs = self
            .jobs
            .iter()
            .enumerate()
            .map(|(job_id, job)| {
                job.iter()
                    .enumerate()
                    .map(|(position, &(machine_id, duration))| {
                        let op = Operation::new(job_id, position, machine_id, duration, operation_id);
                        operation_id += 1;
                        op
                    })
                    .collect()
            })
            .collect();

        Ok(Instance {
            jobs,
            num_machines,
            name: self.name.unwrap_or_else(|| DEFAULT_INSTANCE_NAME.to_string()),
            metadata: self.metadata,
        })
    }
}

impl TryFrom<InstanceBuilder> for Instance {
    type Error = JobShopError;

    fn try_from(builder: InstanceBuilder) -> Result<Self> {
        builder.build()
    }
}

impl From<Instance> for InstanceBuilder {
    fn from(instance: Instance) -> Self {
        let jobs = instance
            .jobs
            .iter()
            .map(|job| job.iter().map(|op| (op.machine_id, op.duration)).collect())
            .collect();
        Self {
            name: Some(instance.name),
            jobs,
            num_machines: Some(instance.num_machines),
            metadata: instance.metadata,
        }
    }
}

impl Instance {
    /// Starts building an instance.
    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::new()
    }

    /// Builds an unnamed instance from `(machine_id, duration)` job lists.
    pub fn from_jobs(jobs: Vec<Vec<(usize, i64)>>) -> Result<Self> {
        InstanceBuilder {
            jobs,
            ..Default::default()
        }
        .build()
    }

    /// Builds an instance from parallel duration and machine matrices.
    ///
    /// `durations[j][k]` and `machines[j][k]` describe operation `k` of job `j`.
    ///
    /// # Errors
    /// [`JobShopError::InstanceValidation`] if the matrices differ in shape,
    /// or if the resulting jobs are invalid.
    pub fn from_matrices(durations: &[Vec<i64>], machines: &[Vec<usize>]) -> Result<Self> {
        validate_matrix_shapes(durations, machines).map_err(JobShopError::InstanceValidation)?;
        let jobs = durations
            .iter()
            .zip(machines)
            .map(|(d_row, m_row)| m_row.iter().copied().zip(d_row.iter().copied()).collect())
            .collect();
        Self::from_jobs(jobs)
    }

    /// Instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Auxiliary metadata.
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Best known makespan, parsed from the `"optimum"` metadata entry.
    pub fn optimum(&self) -> Option<i64> {
        self.metadata.get(OPTIMUM_KEY)?.trim().parse().ok()
    }

    /// Jobs in id order.
    pub fn jobs(&self) -> &[Vec<Operation>] {
        &self.jobs
    }

    /// Operations of one job.
    pub fn job(&self, job_id: usize) -> Option<&[Operation]> {
        self.jobs.get(job_id).map(Vec::as_slice)
    }

    /// Operation at `(job_id, position_in_job)`.
    pub fn operation(&self, job_id: usize, position_in_job: usize) -> Option<&Operation> {
        self.jobs.get(job_id)?.get(position_in_job)
    }

    /// All operations, job-major.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> + '_ {
        self.jobs.iter().flatten()
    }

    /// Number of jobs.
    pub fn num_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Number of machines.
    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    /// Total number of operations.
    pub fn num_operations(&self) -> usize {
        self.jobs.iter().map(Vec::len).sum()
    }

    /// Operations grouped by machine, each group in job-major order.
    pub fn operations_by_machine(&self) -> Vec<Vec<Operation>> {
        let mut by_machine = vec![Vec::new(); self.num_machines];
        for op in self.operations() {
            by_machine[op.machine_id].push(*op);
        }
        by_machine
    }

    /// `durations_matrix()[j][k]` = duration of operation `k` of job `j`.
    pub fn durations_matrix(&self) -> Vec<Vec<i64>> {
        self.jobs
            .iter()
            .map(|job| job.iter().map(|op| op.duration).collect())
            .collect()
    }

    /// `machines_matrix()[j][k]` = machine of operation `k` of job `j`.
    pub fn machines_matrix(&self) -> Vec<Vec<usize>> {
        self.jobs
            .iter()
            .map(|job| job.iter().map(|op| op.machine_id).collect())
            .collect()
    }

    /// Sum of operation durations per job.
    pub fn job_durations(&self) -> Vec<i64> {
        self.jobs
            .iter()
            .map(|job| job.iter().map(|op| op.duration).sum())
            .collect()
    }

    /// Sum of operation durations per machine.
    pub fn machine_loads(&self) -> Vec<i64> {
        let mut loads = vec![0; self.num_machines];
        for op in self.operations() {
            loads[op.machine_id] += op.duration;
        }
        loads
    }

    /// Sum of all operation durations.
    pub fn total_duration(&self) -> i64 {
        self.operations().map(|op| op.duration).sum()
    }

    /// Longest single operation.
    pub fn max_duration(&self) -> i64 {
        self.operations().map(|op| op.duration).max().unwrap_or(0)
    }

    /// Longest operation per job.
    pub fn max_duration_per_job(&self) -> Vec<i64> {
        self.jobs
            .iter()
            .map(|job| job.iter().map(|op| op.duration).max().unwrap_or(0))
            .collect()
    }

    /// Longest operation per machine (0 for unused machines).
    pub fn max_duration_per_machine(&self) -> Vec<i64> {
        let mut longest = vec![0; self.num_machines];
        for op in self.operations() {
            longest[op.machine_id] = longest[op.machine_id].max(op.duration);
        }
        longest
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance(name={}, num_jobs={}, num_machines={})",
            self.name,
            self.num_jobs(),
            self.num_machines
        )
    }
}
