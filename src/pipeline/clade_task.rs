//! Per-clade task: exclusive regions, track conversion, liftover fan-out

use crate::core::{
    layout::{ensure_dir, require_file},
    Clade, DirectoryLayout, ExclusivityThresholds, Result, TaskKind,
};
use crate::execution::{Task, TaskContext, TaskOutcome};
use crate::pipeline::{CleanupTask, LiftoverTask};
use crate::tools::{ToolInvocation, ToolPaths};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Computes the regions exclusive to one clade and schedules their
/// liftover to every descendant genome
#[derive(Debug, Clone)]
pub struct CladeExclusiveTask {
    alignment: PathBuf,
    clade: Clade,
    layout: DirectoryLayout,
    thresholds: ExclusivityThresholds,
    tools: ToolPaths,
}

impl CladeExclusiveTask {
    pub fn new(
        alignment: PathBuf,
        clade: Clade,
        layout: DirectoryLayout,
        thresholds: ExclusivityThresholds,
        tools: ToolPaths,
    ) -> Self {
        Self {
            alignment,
            clade,
            layout,
            thresholds,
            tools,
        }
    }

    pub fn clade(&self) -> &Clade {
        &self.clade
    }

    /// The region-tool command this task will issue first
    pub fn region_invocation(&self) -> ToolInvocation {
        let clade_dir = self.layout.clade_dir(self.clade.root());
        self.tools.find_regions(
            &self.alignment,
            self.clade.root(),
            &self.clade.joined(),
            self.thresholds.normalize(self.clade.len()),
            &self.layout.region_file(&clade_dir, self.clade.root()),
        )
    }
}

#[async_trait]
impl Task for CladeExclusiveTask {
    fn kind(&self) -> TaskKind {
        TaskKind::CladeExclusive {
            clade_root: self.clade.root().to_string(),
        }
    }

    async fn run(&self, ctx: &TaskContext) -> Result<TaskOutcome> {
        let root = self.clade.root();
        let clade_dir = self.layout.clade_dir(root);
        info!("Clade {} -> {}", self.clade, clade_dir.display());

        let chrom_sizes = self.layout.chrom_sizes(root);
        require_file(&chrom_sizes).await?;

        ensure_dir(&clade_dir).await?;

        let regions = self.layout.region_file(&clade_dir, root);
        ctx.run_tool(&self.region_invocation()).await?;

        let track = self.layout.track_file(&clade_dir, root);
        ctx.run_tool(&self.tools.bed_to_big_bed(&regions, &chrom_sizes, &track))
            .await?;

        let mut outcome = TaskOutcome::done();
        for target in self.clade.descendants() {
            outcome = outcome.with_child(LiftoverTask {
                clade_dir: clade_dir.clone(),
                alignment: self.alignment.clone(),
                source: root.to_string(),
                source_regions: regions.clone(),
                target: target.clone(),
                target_chrom_sizes: self.layout.chrom_sizes(target),
                layout: self.layout.clone(),
                tools: self.tools.clone(),
            });
        }

        Ok(outcome.with_follow_on(CleanupTask::new(
            root.to_string(),
            clade_dir,
            self.layout.region_ext().to_string(),
        )))
    }
}
