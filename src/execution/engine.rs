//! Main execution engine - runs a graph of tasks to completion
//!
//! Root tasks run concurrently. For every task the engine runs the body,
//! spawns the returned children, waits for all of them and only then runs
//! the follow-on. A failed child blocks its parent's follow-on but never
//! cancels siblings or unrelated subtrees.

use crate::{
    core::{ExecutionReport, ExecutionStatus, TaskId, TaskKind, TaskRecord, TaskRole, TaskState},
    execution::{BoxedTask, ExecutionScheduler, SchedulingStrategy, TaskContext},
    tools::ToolRunner,
};
use chrono::Utc;
use futures::future::{join_all, BoxFuture, FutureExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Events that can occur during execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        root_tasks: usize,
    },
    TaskStarted {
        task_id: TaskId,
        kind: TaskKind,
    },
    TaskCompleted {
        task_id: TaskId,
        kind: TaskKind,
        children: usize,
        has_follow_on: bool,
    },
    TaskFailed {
        task_id: TaskId,
        kind: TaskKind,
        error: String,
    },
    /// A follow-on was not run because children of its parent failed
    FollowOnBlocked {
        kind: TaskKind,
        failed_children: usize,
    },
    PipelineCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Task graph execution engine
pub struct ExecutionEngine {
    runner: Arc<dyn ToolRunner>,
    strategy: SchedulingStrategy,
    event_handlers: Vec<EventHandler>,
}

/// State shared by every task of one run
struct RunState {
    context: TaskContext,
    scheduler: ExecutionScheduler,
    event_handlers: Vec<EventHandler>,
    records: Mutex<Vec<TaskRecord>>,
    clock: AtomicU64,
}

impl RunState {
    fn emit(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Next value of the run's monotonic clock
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::SeqCst)
    }

    async fn record(&self, record: TaskRecord) {
        self.records.lock().await.push(record);
    }
}

impl ExecutionEngine {
    pub fn new<R: ToolRunner + 'static>(runner: R, strategy: SchedulingStrategy) -> Self {
        Self::with_runner(Arc::new(runner), strategy)
    }

    pub fn with_runner(runner: Arc<dyn ToolRunner>, strategy: SchedulingStrategy) -> Self {
        Self {
            runner,
            strategy,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    /// Run every root task and everything it spawns. Returns once all work
    /// has settled; failures are reported in the returned report rather
    /// than aborting other subtrees.
    pub async fn execute(&self, roots: Vec<BoxedTask>) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        report.start();

        info!(
            "Starting execution {} with {} root task(s) ({:?})",
            report.execution_id,
            roots.len(),
            self.strategy
        );

        let state = Arc::new(RunState {
            context: TaskContext::new(self.runner.clone()),
            scheduler: ExecutionScheduler::new(self.strategy),
            event_handlers: self.event_handlers.clone(),
            records: Mutex::new(Vec::new()),
            clock: AtomicU64::new(0),
        });

        state.emit(ExecutionEvent::PipelineStarted {
            execution_id: report.execution_id,
            root_tasks: roots.len(),
        });

        let handles: Vec<_> = roots
            .into_iter()
            .map(|task| tokio::spawn(run_task(state.clone(), task, None, TaskRole::Root)))
            .collect();
        let all_succeeded = settle(join_all(handles).await) == 0;

        report.records = std::mem::take(&mut *state.records.lock().await);
        report.finish();
        if !all_succeeded {
            report.status = ExecutionStatus::Failed;
        }

        info!(
            "Execution {} finished: {:?} ({} task(s), {} failed, {} skipped)",
            report.execution_id,
            report.status,
            report.records.len(),
            report.failures().len(),
            report.skipped().len()
        );
        state.emit(ExecutionEvent::PipelineCompleted {
            execution_id: report.execution_id,
            status: report.status,
        });

        report
    }
}

/// Count the subtrees that failed, treating a panicked task as failed
fn settle(results: Vec<Result<bool, tokio::task::JoinError>>) -> usize {
    results
        .into_iter()
        .filter(|result| match result {
            Ok(succeeded) => !succeeded,
            Err(e) => {
                error!("Task panicked or was aborted: {}", e);
                true
            }
        })
        .count()
}

/// Run one task, its children and its follow-on. Resolves to whether the
/// whole subtree succeeded.
fn run_task(
    state: Arc<RunState>,
    task: BoxedTask,
    parent: Option<TaskId>,
    role: TaskRole,
) -> BoxFuture<'static, bool> {
    async move {
        let id = Uuid::new_v4();
        let kind = task.kind();

        let (result, started_at, started_seq, finished_at, finished_seq) = {
            let _permit = match state.scheduler.acquire().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Scheduler closed before {} could start: {}", kind, e);
                    state
                        .record(TaskRecord {
                            id,
                            parent,
                            kind,
                            role,
                            state: TaskState::Skipped {
                                reason: "scheduler closed".to_string(),
                            },
                        })
                        .await;
                    return false;
                }
            };

            debug!("Starting {}", kind);
            state.emit(ExecutionEvent::TaskStarted {
                task_id: id,
                kind: kind.clone(),
            });
            let started_at = Utc::now();
            let started_seq = state.tick();
            let result = task.run(&state.context).await;
            (result, started_at, started_seq, Utc::now(), state.tick())
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("{} failed: {}", kind, e);
                let message = e.to_string();
                state
                    .record(TaskRecord {
                        id,
                        parent,
                        kind: kind.clone(),
                        role,
                        state: TaskState::Failed {
                            error: message.clone(),
                            started_at,
                            failed_at: finished_at,
                            started_seq,
                            finished_seq,
                        },
                    })
                    .await;
                state.emit(ExecutionEvent::TaskFailed {
                    task_id: id,
                    kind,
                    error: message,
                });
                return false;
            }
        };

        state
            .record(TaskRecord {
                id,
                parent,
                kind: kind.clone(),
                role,
                state: TaskState::Completed {
                    started_at,
                    completed_at: finished_at,
                    started_seq,
                    finished_seq,
                },
            })
            .await;
        info!(
            "{} completed ({} child task(s){})",
            kind,
            outcome.children.len(),
            if outcome.follow_on.is_some() { ", follow-on pending" } else { "" }
        );
        state.emit(ExecutionEvent::TaskCompleted {
            task_id: id,
            kind: kind.clone(),
            children: outcome.children.len(),
            has_follow_on: outcome.follow_on.is_some(),
        });

        let handles: Vec<_> = outcome
            .children
            .into_iter()
            .map(|child| tokio::spawn(run_task(state.clone(), child, Some(id), TaskRole::Child)))
            .collect();
        let failed_children = settle(join_all(handles).await);

        match outcome.follow_on {
            Some(follow_on) if failed_children == 0 => {
                run_task(state, follow_on, Some(id), TaskRole::FollowOn).await
            }
            Some(follow_on) => {
                let follow_on_kind = follow_on.kind();
                warn!(
                    "Not running {}: {} task(s) spawned by {} failed",
                    follow_on_kind, failed_children, kind
                );
                state
                    .record(TaskRecord {
                        id: Uuid::new_v4(),
                        parent: Some(id),
                        kind: follow_on_kind.clone(),
                        role: TaskRole::FollowOn,
                        state: TaskState::Skipped {
                            reason: format!(
                                "{} task(s) spawned by {} failed",
                                failed_children, kind
                            ),
                        },
                    })
                    .await;
                state.emit(ExecutionEvent::FollowOnBlocked {
                    kind: follow_on_kind,
                    failed_children,
                });
                false
            }
            None => failed_children == 0,
        }
    }
    .boxed()
}
