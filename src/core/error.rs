//! Error types for the clade-exclusive pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or running the clade task graph
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An external command exited non-zero or did not produce its outputs
    #[error("{tool} failed: {reason}\n  command: {command}")]
    ToolInvocation {
        tool: String,
        command: String,
        reason: String,
    },

    /// A file another pipeline stage must provide is absent
    #[error("Missing required file: {}", path.display())]
    MissingCollaboratorFile { path: PathBuf },

    /// The working directory of a clade could not be created
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Intermediate region files could not be removed
    #[error("Failed to clean up {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid clade: {0}")]
    InvalidClade(String),

    #[error("Invalid tree: {0}")]
    Tree(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
