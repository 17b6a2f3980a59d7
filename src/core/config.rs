//! Pipeline configuration from YAML

use crate::core::{
    clade::ExclusivityThresholds,
    layout::DirectoryLayout,
    tree::GenomeTree,
};
use crate::execution::SchedulingStrategy;
use crate::tools::ToolPaths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Run label used in logs and reports
    pub name: String,

    /// Multi-genome alignment file passed to the external tools
    pub alignment: PathBuf,

    /// Root of the track output tree; `CladeExclusive/` is created below it
    pub output_root: PathBuf,

    /// Inline Newick tree
    #[serde(default)]
    pub tree: Option<String>,

    /// Newick tree read from a file
    #[serde(default)]
    pub tree_file: Option<PathBuf>,

    /// Clade-exclusive region settings
    #[serde(default)]
    pub clade_exclusive: CladeExclusiveConfig,

    /// External executables
    #[serde(default)]
    pub tools: ToolConfig,

    /// How many task bodies may run at once
    #[serde(default)]
    pub scheduling: SchedulingMode,

    /// Concurrency cap for `scheduling: limited`
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,
}

/// Requirements on regions exclusive to a clade
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CladeExclusiveConfig {
    /// Whether to generate clade-exclusive tracks at all
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of outgroup genomes a region may appear in
    #[serde(default)]
    pub max_outgroup_genomes: usize,

    /// Minimum number of ingroup genomes a region must appear in.
    /// Defaults to every genome of the clade.
    #[serde(default)]
    pub min_ingroup_genomes: Option<usize>,
}

impl CladeExclusiveConfig {
    pub fn thresholds(&self) -> ExclusivityThresholds {
        ExclusivityThresholds::new(self.max_outgroup_genomes, self.min_ingroup_genomes)
    }
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default = "default_find_regions")]
    pub find_regions: String,

    #[serde(default = "default_liftover")]
    pub liftover: String,

    #[serde(default = "default_bed_to_big_bed")]
    pub bed_to_big_bed: String,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            find_regions: default_find_regions(),
            liftover: default_liftover(),
            bed_to_big_bed: default_bed_to_big_bed(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ToolConfig {
    pub fn paths(&self) -> ToolPaths {
        ToolPaths {
            find_regions: self.find_regions.clone(),
            liftover: self.liftover.clone(),
            bed_to_big_bed: self.bed_to_big_bed.clone(),
        }
    }
}

/// Scheduling mode as written in YAML
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingMode {
    Sequential,
    #[default]
    Parallel,
    Limited,
}

fn default_find_regions() -> String {
    "findRegionsExclusivelyInGroup".to_string()
}

fn default_liftover() -> String {
    "halLiftover".to_string()
}

fn default_bed_to_big_bed() -> String {
    "bedToBigBed".to_string()
}

fn default_timeout_secs() -> u64 {
    86400
}

fn default_max_parallel() -> usize {
    4
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Pipeline name must not be empty");
        }

        match (&self.tree, &self.tree_file) {
            (None, None) => anyhow::bail!("One of 'tree' or 'tree_file' is required"),
            (Some(_), Some(_)) => anyhow::bail!("Only one of 'tree' or 'tree_file' may be given"),
            (Some(newick), None) => {
                GenomeTree::from_newick(newick).context("Invalid 'tree'")?;
            }
            (None, Some(_)) => {}
        }

        if self.scheduling == SchedulingMode::Limited && self.max_parallel == 0 {
            anyhow::bail!("'max_parallel' must be at least 1 with limited scheduling");
        }

        if self.tools.timeout_secs == 0 {
            anyhow::bail!("'tools.timeout_secs' must be positive");
        }

        Ok(())
    }

    /// Parse the configured tree
    pub fn load_tree(&self) -> Result<GenomeTree> {
        let newick = match (&self.tree, &self.tree_file) {
            (Some(newick), _) => newick.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read tree file {}", path.display()))?,
            (None, None) => anyhow::bail!("No tree configured"),
        };
        Ok(GenomeTree::from_newick(&newick)?)
    }

    pub fn layout(&self) -> DirectoryLayout {
        DirectoryLayout::new(&self.output_root)
    }

    pub fn strategy(&self) -> SchedulingStrategy {
        match self.scheduling {
            SchedulingMode::Sequential => SchedulingStrategy::Sequential,
            SchedulingMode::Parallel => SchedulingStrategy::Parallel,
            SchedulingMode::Limited => SchedulingStrategy::LimitedParallel(self.max_parallel),
        }
    }
}
