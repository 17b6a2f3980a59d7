//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one task instance in a run
pub type TaskId = Uuid;

/// Overall execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Not started yet
    Pending,
    /// Tasks are running
    Running,
    /// Every task completed
    Completed,
    /// At least one task failed
    Failed,
}

/// What a task does, with the genomes it concerns
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum TaskKind {
    /// Region computation and track conversion for a clade
    CladeExclusive { clade_root: String },
    /// Liftover of a clade's regions to one descendant genome
    Liftover { clade_root: String, target: String },
    /// Removal of a clade's intermediate region files
    Cleanup { clade_root: String },
}

impl TaskKind {
    /// Representative genome of the clade the task belongs to
    pub fn clade_root(&self) -> &str {
        match self {
            TaskKind::CladeExclusive { clade_root }
            | TaskKind::Liftover { clade_root, .. }
            | TaskKind::Cleanup { clade_root } => clade_root,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::CladeExclusive { clade_root } => write!(f, "clade-exclusive[{}]", clade_root),
            TaskKind::Liftover { clade_root, target } => {
                write!(f, "liftover[{} -> {}]", clade_root, target)
            }
            TaskKind::Cleanup { clade_root } => write!(f, "cleanup[{}]", clade_root),
        }
    }
}

/// How a task entered the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRole {
    /// Submitted directly to the engine
    Root,
    /// Spawned by another task's body
    Child,
    /// Scheduled to run after another task and all its children
    FollowOn,
}

/// Terminal state of a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskState {
    /// Body ran and succeeded
    Completed {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        /// Monotonic engine clock when the body started / finished
        started_seq: u64,
        finished_seq: u64,
    },
    /// Body ran and failed
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
        started_seq: u64,
        finished_seq: u64,
    },
    /// Never ran because something it waits on failed
    Skipped { reason: String },
}

impl TaskState {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskState::Completed { .. })
    }

    /// Engine clock value at which the body started, if it ran
    pub fn started_seq(&self) -> Option<u64> {
        match self {
            TaskState::Completed { started_seq, .. } | TaskState::Failed { started_seq, .. } => {
                Some(*started_seq)
            }
            TaskState::Skipped { .. } => None,
        }
    }

    /// Engine clock value at which the body finished, if it ran
    pub fn finished_seq(&self) -> Option<u64> {
        match self {
            TaskState::Completed { finished_seq, .. }
            | TaskState::Failed { finished_seq, .. } => Some(*finished_seq),
            TaskState::Skipped { .. } => None,
        }
    }
}

/// One task's outcome in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub parent: Option<TaskId>,
    pub kind: TaskKind,
    pub role: TaskRole,
    pub state: TaskState,
}

/// Result of executing a task graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub execution_id: Uuid,
    pub status: ExecutionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records: Vec<TaskRecord>,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            records: Vec::new(),
        }
    }

    /// Mark the run as started
    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Settle the final status from the collected records
    pub fn finish(&mut self) {
        self.status = if self.records.iter().all(|r| r.state.is_success()) {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        self.completed_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    /// Tasks whose body failed
    pub fn failures(&self) -> Vec<&TaskRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.state, TaskState::Failed { .. }))
            .collect()
    }

    /// Tasks that never ran
    pub fn skipped(&self) -> Vec<&TaskRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.state, TaskState::Skipped { .. }))
            .collect()
    }

    /// Records of every task belonging to the clade rooted at `clade_root`
    pub fn for_clade<'a>(&'a self, clade_root: &'a str) -> impl Iterator<Item = &'a TaskRecord> {
        self.records
            .iter()
            .filter(move |r| r.kind.clade_root() == clade_root)
    }

    pub fn record(&self, kind: &TaskKind) -> Option<&TaskRecord> {
        self.records.iter().find(|r| &r.kind == kind)
    }
}

impl Default for ExecutionReport {
    fn default() -> Self {
        Self::new()
    }
}
