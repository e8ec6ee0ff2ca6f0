mod align;
pub mod config;
mod orchestrator;
mod types;

pub use align::AlignmentPipeline;
pub use orchestrator::run_alignment;
pub use types::{
    AlignmentOutput, CancelToken, NoOpReporter, PipelineStage, PipelineState, ProgressReporter,
};
