//! Clade-exclusive region pipeline
//!
//! Per clade: compute the exclusive regions of the representative genome,
//! index them, lift them over to each descendant (in parallel), then
//! remove the intermediate region files once every liftover succeeded.

pub mod clade_task;
pub mod cleanup;
pub mod driver;
pub mod liftover;

pub use clade_task::CladeExclusiveTask;
pub use cleanup::CleanupTask;
pub use driver::PipelineDriver;
pub use liftover::LiftoverTask;
