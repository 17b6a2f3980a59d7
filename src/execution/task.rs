//! Task abstraction
//!
//! A task's body may hand back children and one follow-on. Children run
//! concurrently once the body returns. The follow-on runs only after the
//! body and every child subtree have succeeded.

use crate::core::{Result, TaskKind};
use crate::tools::{ToolInvocation, ToolRunner};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Owned, type-erased task
pub type BoxedTask = Box<dyn Task>;

/// A unit of work in the task graph
#[async_trait]
pub trait Task: Send + Sync {
    /// What the task does and which genomes it concerns
    fn kind(&self) -> TaskKind;

    /// Run the task body
    async fn run(&self, ctx: &TaskContext) -> Result<TaskOutcome>;
}

/// Work produced by a successful task body
#[derive(Default)]
pub struct TaskOutcome {
    /// Mutually independent tasks to run after the body
    pub children: Vec<BoxedTask>,

    /// Task to run after the body and all children succeed
    pub follow_on: Option<BoxedTask>,
}

impl TaskOutcome {
    /// Nothing further to run
    pub fn done() -> Self {
        Self::default()
    }

    pub fn with_child(mut self, child: impl Task + 'static) -> Self {
        self.children.push(Box::new(child));
        self
    }

    pub fn with_follow_on(mut self, follow_on: impl Task + 'static) -> Self {
        self.follow_on = Some(Box::new(follow_on));
        self
    }
}

impl std::fmt::Debug for TaskOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskOutcome")
            .field(
                "children",
                &self.children.iter().map(|c| c.kind()).collect::<Vec<_>>(),
            )
            .field("follow_on", &self.follow_on.as_ref().map(|f| f.kind()))
            .finish()
    }
}

/// Handle passed to every task body
#[derive(Clone)]
pub struct TaskContext {
    runner: Arc<dyn ToolRunner>,
}

impl TaskContext {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Run an external command, turning any failure into a
    /// `ToolInvocation` error that carries the command line
    pub async fn run_tool(&self, invocation: &ToolInvocation) -> Result<()> {
        info!("Running {}", invocation.tool_name());
        self.runner
            .run(invocation)
            .await
            .map_err(|e| e.into_pipeline_error(invocation))
    }
}
