//! First pass over the video: per-frame change metrics, the gameplay window,
//! and the frames worth compositing.

pub mod active_range;
pub mod analyzer;
pub mod pixel;

pub use active_range::{detect_active_range, merge_frame_indices, ActiveRange, RangeTier};
pub use analyzer::{AnalysisOutput, FrameAnalyzer, FrameMetrics, SamplingPlan};
