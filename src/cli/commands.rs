//! CLI command definitions

use crate::core::config::{PipelineConfig, SchedulingMode};
use clap::Args;
use std::path::PathBuf;

/// Run the clade-exclusive pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Write the execution report as JSON to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show the clades and commands a run would execute
#[derive(Debug, Args, Clone)]
pub struct PlanCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Command-line values that take precedence over the YAML file
#[derive(Debug, Args, Clone, Default)]
pub struct ConfigOverrides {
    /// Generate tracks of regions exclusive to each clade of the tree
    #[arg(long)]
    pub clade_exclusive_regions: bool,

    /// Maximum number of outgroup genomes a region may appear in
    #[arg(long)]
    pub max_outgroup_genomes: Option<usize>,

    /// Minimum number of ingroup genomes a region must appear in
    /// (default: every genome of the clade)
    #[arg(long)]
    pub min_ingroup_genomes: Option<usize>,

    /// Alignment file
    #[arg(long)]
    pub alignment: Option<PathBuf>,

    /// Root of the track output tree
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Scheduling strategy
    #[arg(long, value_enum)]
    pub strategy: Option<SchedulingStrategyArg>,

    /// Concurrency cap for the limited strategy
    #[arg(long)]
    pub max_parallel: Option<usize>,
}

impl ConfigOverrides {
    /// Apply the overrides to a loaded configuration
    pub fn apply(&self, config: &mut PipelineConfig) {
        if self.clade_exclusive_regions {
            config.clade_exclusive.enabled = true;
        }
        if let Some(max_out) = self.max_outgroup_genomes {
            config.clade_exclusive.max_outgroup_genomes = max_out;
        }
        if let Some(min_in) = self.min_ingroup_genomes {
            config.clade_exclusive.min_ingroup_genomes = Some(min_in);
        }
        if let Some(alignment) = &self.alignment {
            config.alignment = alignment.clone();
        }
        if let Some(output_root) = &self.output_root {
            config.output_root = output_root.clone();
        }
        if let Some(strategy) = self.strategy {
            config.scheduling = strategy.into();
        }
        if let Some(max_parallel) = self.max_parallel {
            config.max_parallel = max_parallel;
        }
    }
}

/// Scheduling strategy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchedulingStrategyArg {
    Sequential,
    Parallel,
    #[clap(name = "parallel-limited")]
    ParallelLimited,
}

impl From<SchedulingStrategyArg> for SchedulingMode {
    fn from(arg: SchedulingStrategyArg) -> Self {
        match arg {
            SchedulingStrategyArg::Sequential => SchedulingMode::Sequential,
            SchedulingStrategyArg::Parallel => SchedulingMode::Parallel,
            SchedulingStrategyArg::ParallelLimited => SchedulingMode::Limited,
        }
    }
}
