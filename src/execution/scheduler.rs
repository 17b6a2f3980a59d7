//! Execution scheduler - bounds how many task bodies run at once

use tokio::sync::{AcquireError, Semaphore, SemaphorePermit};

/// Strategy for scheduling task execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulingStrategy {
    /// One task body at a time
    Sequential,

    /// Every ready task at once
    #[default]
    Parallel,

    /// Limited parallelism (max N concurrent task bodies)
    LimitedParallel(usize),
}

impl SchedulingStrategy {
    /// Number of task bodies allowed to run concurrently
    pub fn max_concurrent(&self) -> usize {
        match self {
            SchedulingStrategy::Sequential => 1,
            SchedulingStrategy::Parallel => Semaphore::MAX_PERMITS,
            SchedulingStrategy::LimitedParallel(max) => (*max).clamp(1, Semaphore::MAX_PERMITS),
        }
    }
}

/// Gate that task bodies pass through before running.
///
/// Only bodies hold a permit. A task waiting on its children holds none,
/// so nested fan-out cannot exhaust the permits and deadlock.
pub struct ExecutionScheduler {
    permits: Semaphore,
}

impl ExecutionScheduler {
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self {
            permits: Semaphore::new(strategy.max_concurrent()),
        }
    }

    /// Wait for a free slot
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        self.permits.acquire().await
    }
}
