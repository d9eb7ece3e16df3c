//! Fixed stage order turning a raw network into a repaired, connected one
//! plus its filtered weighted graph.

mod builder;
mod config;

pub use builder::{PipelineOutcome, PipelineReport, run_pipeline};
pub use config::PipelineConfig;
