//! Tool runner error types

use crate::core::PipelineError;
use crate::tools::ToolInvocation;
use std::path::PathBuf;
use thiserror::Error;

/// Why an external command did not succeed
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start: {0}")]
    Spawn(String),

    #[error("exited with code {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("expected output {} was not produced", .0.display())]
    MissingOutput(PathBuf),

    #[error("timed out after {0} seconds")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Attach the failed invocation, giving the error the context needed
    /// to reproduce the command
    pub fn into_pipeline_error(self, invocation: &ToolInvocation) -> PipelineError {
        PipelineError::ToolInvocation {
            tool: invocation.tool_name().to_string(),
            command: invocation.command_line(),
            reason: self.to_string(),
        }
    }
}
