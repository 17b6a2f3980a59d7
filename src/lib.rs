//! clade-exclusive - tracks of regions exclusive to each clade of a genome tree
//!
//! Every clade becomes a task that computes its exclusive regions, indexes
//! them, lifts them over to each descendant genome and finally removes the
//! intermediate files. The task graph runs on [`ExecutionEngine`].

pub mod cli;
pub mod core;
pub mod execution;
pub mod pipeline;
pub mod tools;

// Re-export commonly used types
pub use crate::core::{Clade, CladeEnumerator, ExclusivityThresholds, ExecutionReport, GenomeTree, PipelineError};
pub use crate::execution::{ExecutionEngine, ExecutionEvent, SchedulingStrategy, Task, TaskOutcome};
pub use crate::pipeline::{CladeExclusiveTask, CleanupTask, LiftoverTask, PipelineDriver};
pub use crate::tools::{SubprocessRunner, ToolInvocation, ToolRunner};
