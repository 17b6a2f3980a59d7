//! Subprocess tool runner - executes external commands directly

use crate::tools::{ToolError, ToolInvocation, ToolRunner};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs tool invocations as child processes
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    /// Timeout for one command in seconds
    timeout_secs: u64,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `timeout_secs` - Timeout for each command in seconds
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    #[cfg(test)]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl Default for SubprocessRunner {
    fn default() -> Self {
        Self::new(86400)
    }
}

#[async_trait]
impl ToolRunner for SubprocessRunner {
    /// Run one invocation to completion
    ///
    /// # Errors
    /// Returns `ToolError` if:
    /// - The executable cannot be spawned
    /// - It exits with a non-zero status
    /// - A declared output file is missing afterwards
    /// - The command times out
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        debug!("Running: {}", invocation);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match &invocation.stdout {
            Some(path) => {
                let file = tokio::fs::File::create(path).await?.into_std().await;
                command.stdout(Stdio::from(file));
            }
            None => {
                command.stdout(Stdio::null());
            }
        }

        // output() would replace the configured stdout with a pipe
        let child = command
            .spawn()
            .map_err(|e| ToolError::Spawn(format!("{}: {}", invocation.program, e)))?;

        let output = timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout(self.timeout_secs))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            warn!("{} exited with code {}: {}", invocation.tool_name(), code, stderr.trim());
            return Err(ToolError::NonZeroExit {
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        for path in &invocation.outputs {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(ToolError::MissingOutput(path.clone()));
            }
        }

        debug!("{} finished", invocation.tool_name());
        Ok(())
    }
}
