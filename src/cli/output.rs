//! CLI output formatting

use crate::{
    core::{ExecutionStatus, TaskKind, TaskRecord, TaskState},
    execution::ExecutionEvent,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner that counts finished tasks; the total grows as tasks
/// spawn children
pub fn create_progress_bar(initial: usize) -> ProgressBar {
    let progress = ProgressBar::new(initial as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a task kind for display
pub fn format_task_kind(kind: &TaskKind) -> String {
    match kind {
        TaskKind::CladeExclusive { clade_root } => {
            format!("{} {}", style("clade").bold(), style(clade_root).cyan())
        }
        TaskKind::Liftover { clade_root, target } => format!(
            "{} {} → {}",
            style("liftover").bold(),
            style(clade_root).cyan(),
            style(target).cyan()
        ),
        TaskKind::Cleanup { clade_root } => {
            format!("{} {}", style("cleanup").bold(), style(clade_root).cyan())
        }
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a failed or skipped task with everything needed to re-run it
pub fn format_task_problem(record: &TaskRecord) -> Option<String> {
    match &record.state {
        TaskState::Failed { error, .. } => Some(format!(
            "{} {}\n    {}",
            CROSS,
            format_task_kind(&record.kind),
            error.replace('\n', "\n    ")
        )),
        TaskState::Skipped { reason } => Some(format!(
            "{} {} not run: {}",
            WARN,
            format_task_kind(&record.kind),
            style(reason).dim()
        )),
        TaskState::Completed { .. } => None,
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            execution_id,
            root_tasks,
        } => format!(
            "{} Starting {} clade task(s) ({})",
            ROCKET,
            style(root_tasks).bold(),
            style(&execution_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::TaskStarted { kind, .. } => {
            format!("{} {}", SPINNER, format_task_kind(kind))
        }
        ExecutionEvent::TaskCompleted {
            kind,
            children,
            has_follow_on,
            ..
        } => {
            if *children > 0 || *has_follow_on {
                format!(
                    "{} {} ({} liftover(s) queued)",
                    CHECK,
                    format_task_kind(kind),
                    children
                )
            } else {
                format!("{} {}", CHECK, format_task_kind(kind))
            }
        }
        ExecutionEvent::TaskFailed { kind, error, .. } => format!(
            "{} {}: {}",
            CROSS,
            format_task_kind(kind),
            style(error).dim()
        ),
        ExecutionEvent::FollowOnBlocked {
            kind,
            failed_children,
        } => format!(
            "{} {} blocked by {} failed task(s)",
            WARN,
            format_task_kind(kind),
            failed_children
        ),
        ExecutionEvent::PipelineCompleted {
            execution_id,
            status,
        } => {
            let status_str = match status {
                ExecutionStatus::Completed => {
                    format!("{} completed", style("successfully").green())
                }
                ExecutionStatus::Failed => style("failed").red().to_string(),
                _ => format!("{:?}", status),
            };
            format!(
                "{} Pipeline ({}) {}",
                INFO,
                style(&execution_id.to_string()[..8]).dim(),
                status_str
            )
        }
    }
}
