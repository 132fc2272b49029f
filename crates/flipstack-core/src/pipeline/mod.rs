pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{process_video_to_image, run_pipeline, run_pipeline_reported};
pub use types::{
    CellSummary, FnReporter, NoOpReporter, PipelineOutput, PipelineReport, PipelineStage,
    ProgressReporter,
};
