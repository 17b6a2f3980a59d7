//! Pipeline driver - turns enumerated clades into clade tasks

use crate::core::{
    layout::ensure_dir, config::PipelineConfig, CladeEnumerator, Clade, DirectoryLayout,
    ExclusivityThresholds, ExecutionReport, Result,
};
use crate::execution::{BoxedTask, ExecutionEngine};
use crate::pipeline::CladeExclusiveTask;
use crate::tools::ToolPaths;
use std::path::PathBuf;
use tracing::{debug, info};

/// Owns the output layout and submits one task per clade
#[derive(Debug, Clone)]
pub struct PipelineDriver {
    alignment: PathBuf,
    layout: DirectoryLayout,
    thresholds: ExclusivityThresholds,
    tools: ToolPaths,
}

impl PipelineDriver {
    pub fn new(
        alignment: PathBuf,
        layout: DirectoryLayout,
        thresholds: ExclusivityThresholds,
        tools: ToolPaths,
    ) -> Self {
        Self {
            alignment,
            layout,
            thresholds,
            tools,
        }
    }

    /// Build a driver from a loaded configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.alignment.clone(),
            config.layout(),
            config.clade_exclusive.thresholds(),
            config.tools.paths(),
        )
    }

    pub fn layout(&self) -> &DirectoryLayout {
        &self.layout
    }

    /// One task per clade that has descendants, in enumeration order
    pub fn plan(&self, clades: Vec<Clade>) -> Vec<CladeExclusiveTask> {
        clades
            .into_iter()
            .filter_map(|clade| {
                if !clade.has_descendants() {
                    debug!("Skipping single-genome clade {}", clade.root());
                    return None;
                }
                Some(CladeExclusiveTask::new(
                    self.alignment.clone(),
                    clade,
                    self.layout.clone(),
                    self.thresholds,
                    self.tools.clone(),
                ))
            })
            .collect()
    }

    /// Enumerate the clades, create the output root and run every clade
    /// task on `engine`
    pub async fn run<E: CladeEnumerator + ?Sized>(
        &self,
        enumerator: &E,
        engine: &ExecutionEngine,
    ) -> Result<ExecutionReport> {
        let clades = enumerator.clades()?;
        let tasks = self.plan(clades);
        info!(
            "Submitting {} clade task(s) under {}",
            tasks.len(),
            self.layout.exclusive_root().display()
        );

        ensure_dir(self.layout.exclusive_root()).await?;

        let roots: Vec<BoxedTask> = tasks
            .into_iter()
            .map(|task| Box::new(task) as BoxedTask)
            .collect();
        Ok(engine.execute(roots).await)
    }
}
