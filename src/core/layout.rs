//! Output directory layout
//!
//! ```text
//! <output_root>/CladeExclusive/<representative>/<genome>.bed   (removed by cleanup)
//! <output_root>/CladeExclusive/<representative>/<genome>.bb
//! <output_root>/../<genome>/chrom.sizes                         (provided upstream)
//! ```

use crate::core::error::{PipelineError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the directory holding one sub-directory per clade
pub const CLADE_EXCLUSIVE_DIR: &str = "CladeExclusive";

/// Name of the per-genome chromosome size table
pub const CHROM_SIZES_FILE: &str = "chrom.sizes";

/// Path conventions for the clade-exclusive outputs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLayout {
    /// `<output_root>/CladeExclusive`
    exclusive_root: PathBuf,

    /// Extension of the intermediate interval files
    region_ext: String,

    /// Extension of the indexed track files
    track_ext: String,
}

impl DirectoryLayout {
    pub fn new(output_root: impl AsRef<Path>) -> Self {
        Self {
            exclusive_root: output_root.as_ref().join(CLADE_EXCLUSIVE_DIR),
            region_ext: "bed".to_string(),
            track_ext: "bb".to_string(),
        }
    }

    pub fn exclusive_root(&self) -> &Path {
        &self.exclusive_root
    }

    pub fn region_ext(&self) -> &str {
        &self.region_ext
    }

    /// Working directory of the clade represented by `representative`
    pub fn clade_dir(&self, representative: &str) -> PathBuf {
        self.exclusive_root.join(representative)
    }

    /// Interval file for `genome` inside a clade directory
    pub fn region_file(&self, clade_dir: &Path, genome: &str) -> PathBuf {
        clade_dir.join(format!("{}.{}", genome, self.region_ext))
    }

    /// Indexed track file for `genome` inside a clade directory
    pub fn track_file(&self, clade_dir: &Path, genome: &str) -> PathBuf {
        clade_dir.join(format!("{}.{}", genome, self.track_ext))
    }

    /// Chromosome size table of `genome`, two levels above the clade tree
    pub fn chrom_sizes(&self, genome: &str) -> PathBuf {
        self.exclusive_root
            .join("..")
            .join("..")
            .join(genome)
            .join(CHROM_SIZES_FILE)
    }
}

/// Create `path` and its parents. An existing directory is not an error,
/// and concurrent callers creating siblings or the same path all succeed.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    debug!("Ensuring directory {}", path.display());
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| PipelineError::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        })
}

/// Fail with `MissingCollaboratorFile` unless `path` exists
pub async fn require_file(path: &Path) -> Result<()> {
    match tokio::fs::try_exists(path).await {
        Ok(true) => Ok(()),
        _ => Err(PipelineError::MissingCollaboratorFile {
            path: path.to_path_buf(),
        }),
    }
}
