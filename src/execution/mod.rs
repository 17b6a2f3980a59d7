//! Task graph execution

pub mod engine;
pub mod scheduler;
pub mod task;

pub use engine::{EventHandler, ExecutionEngine, ExecutionEvent};
pub use scheduler::{ExecutionScheduler, SchedulingStrategy};
pub use task::{BoxedTask, Task, TaskContext, TaskOutcome};
