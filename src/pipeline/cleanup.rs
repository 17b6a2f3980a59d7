//! Removal of a clade's intermediate region files

use crate::core::{PipelineError, Result, TaskKind};
use crate::execution::{Task, TaskContext, TaskOutcome};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Deletes every `*.<region_ext>` file in a clade directory, leaving the
/// indexed tracks in place
#[derive(Debug, Clone)]
pub struct CleanupTask {
    clade_root: String,
    clade_dir: PathBuf,
    region_ext: String,
}

impl CleanupTask {
    pub fn new(clade_root: String, clade_dir: PathBuf, region_ext: String) -> Self {
        Self {
            clade_root,
            clade_dir,
            region_ext,
        }
    }

    /// Remove the region files, returning how many were deleted. A missing
    /// directory or no matching files is a no-op.
    pub async fn remove_region_files(&self) -> Result<usize> {
        let cleanup_error = |source| PipelineError::Cleanup {
            path: self.clade_dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.clade_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(cleanup_error(e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(cleanup_error)? {
            let path = entry.path();
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            if !is_file || !self.is_region_file(&path) {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(cleanup_error(e)),
            }
        }
        Ok(removed)
    }

    fn is_region_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.region_ext.as_str())
    }
}

#[async_trait]
impl Task for CleanupTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Cleanup {
            clade_root: self.clade_root.clone(),
        }
    }

    async fn run(&self, _ctx: &TaskContext) -> Result<TaskOutcome> {
        let removed = self.remove_region_files().await?;
        info!(
            "Removed {} region file(s) from {}",
            removed,
            self.clade_dir.display()
        );
        Ok(TaskOutcome::done())
    }
}
