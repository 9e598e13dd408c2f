//! Dispatch pipeline module.

mod orchestrator;
mod stats;

pub use orchestrator::{InputSource, Pipeline, PipelineConfig};
pub use stats::PipelineStats;
