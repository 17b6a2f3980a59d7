//! External tool invocation
//!
//! Every leaf task ends in one or more external commands. They are built
//! as [`ToolInvocation`]s and executed by a [`ToolRunner`], so tests can
//! substitute a fake runner for the real binaries.

pub mod error;
pub mod invocation;
pub mod subprocess;

use crate::core::EffectiveThresholds;
use async_trait::async_trait;
use std::path::Path;

pub use error::ToolError;
pub use invocation::ToolInvocation;
pub use subprocess::SubprocessRunner;

/// Trait for running external commands - allows for different implementations
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run the invocation to completion. Succeeds only on a zero exit with
    /// every declared output present.
    async fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError>;
}

/// Names or paths of the external executables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub find_regions: String,
    pub liftover: String,
    pub bed_to_big_bed: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            find_regions: "findRegionsExclusivelyInGroup".to_string(),
            liftover: "halLiftover".to_string(),
            bed_to_big_bed: "bedToBigBed".to_string(),
        }
    }
}

impl ToolPaths {
    /// `findRegionsExclusivelyInGroup --maxOutgroupGenomes N --minIngroupGenomes M
    /// <alignment> <root> <g1,g2,...> > <out>`
    pub fn find_regions(
        &self,
        alignment: &Path,
        representative: &str,
        members: &str,
        thresholds: EffectiveThresholds,
        out: &Path,
    ) -> ToolInvocation {
        ToolInvocation::new(&self.find_regions)
            .arg("--maxOutgroupGenomes")
            .arg(thresholds.max_outgroup.to_string())
            .arg("--minIngroupGenomes")
            .arg(thresholds.min_ingroup.to_string())
            .path_arg(alignment)
            .arg(representative)
            .arg(members)
            .stdout_to(out)
    }

    /// `halLiftover <alignment> <source> <source.bed> <target> <target.bed>`
    pub fn liftover(
        &self,
        alignment: &Path,
        source: &str,
        source_regions: &Path,
        target: &str,
        target_regions: &Path,
    ) -> ToolInvocation {
        ToolInvocation::new(&self.liftover)
            .path_arg(alignment)
            .arg(source)
            .path_arg(source_regions)
            .arg(target)
            .path_arg(target_regions)
            .output(target_regions)
    }

    /// `bedToBigBed <regions> <chrom.sizes> <track>`
    pub fn bed_to_big_bed(&self, regions: &Path, chrom_sizes: &Path, track: &Path) -> ToolInvocation {
        ToolInvocation::new(&self.bed_to_big_bed)
            .path_arg(regions)
            .path_arg(chrom_sizes)
            .path_arg(track)
            .output(track)
    }
}
