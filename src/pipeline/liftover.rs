//! Liftover of a clade's exclusive regions to one descendant genome

use crate::core::{layout::require_file, DirectoryLayout, Result, TaskKind};
use crate::execution::{Task, TaskContext, TaskOutcome};
use crate::tools::ToolPaths;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Maps the representative genome's region file onto `target` and
/// indexes the result. Writes only `<target>.*` files in the clade
/// directory, so siblings never collide.
#[derive(Debug, Clone)]
pub struct LiftoverTask {
    pub clade_dir: PathBuf,
    pub alignment: PathBuf,
    /// Representative genome of the clade
    pub source: String,
    pub source_regions: PathBuf,
    pub target: String,
    pub target_chrom_sizes: PathBuf,
    pub layout: DirectoryLayout,
    pub tools: ToolPaths,
}

#[async_trait]
impl Task for LiftoverTask {
    fn kind(&self) -> TaskKind {
        TaskKind::Liftover {
            clade_root: self.source.clone(),
            target: self.target.clone(),
        }
    }

    async fn run(&self, ctx: &TaskContext) -> Result<TaskOutcome> {
        debug!("Lifting {} regions over to {}", self.source, self.target);
        require_file(&self.target_chrom_sizes).await?;

        let target_regions = self.layout.region_file(&self.clade_dir, &self.target);
        ctx.run_tool(&self.tools.liftover(
            &self.alignment,
            &self.source,
            &self.source_regions,
            &self.target,
            &target_regions,
        ))
        .await?;

        let track = self.layout.track_file(&self.clade_dir, &self.target);
        ctx.run_tool(&self.tools.bed_to_big_bed(
            &target_regions,
            &self.target_chrom_sizes,
            &track,
        ))
        .await?;

        Ok(TaskOutcome::done())
    }
}
