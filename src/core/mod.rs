//! Core domain models
//!
//! Clades, the genome tree they come from, thresholds, the output layout,
//! configuration and the execution state reported back to callers.

pub mod clade;
pub mod config;
pub mod error;
pub mod layout;
pub mod state;
pub mod tree;

pub use clade::*;
pub use error::{PipelineError, Result};
pub use layout::DirectoryLayout;
pub use state::*;
pub use tree::{CladeEnumerator, GenomeTree};
