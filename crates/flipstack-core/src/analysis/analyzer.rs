use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::consts::TIMESTAMP_EPSILON_SECS;
use crate::error::Result;
use crate::frame::{Frame, FrameSize};
use crate::io::source::FrameSource;
use crate::pipeline::config::ThresholdConfig;

use super::pixel::changed_ratio;

/// Whole-frame change measurements for one sampled frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Fraction of pixels differing from the baseline frame.
    pub baseline_ratio: f32,
    /// Fraction of pixels differing from the previous sampled frame.
    pub motion_ratio: f32,
}

/// Which timestamps get decoded, at a fixed analysis rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplingPlan {
    pub duration: f64,
    pub fps: f64,
    pub frame_count: usize,
}

impl SamplingPlan {
    pub fn new(duration: f64, fps: f64) -> Self {
        let frame_count = ((duration * fps).floor() as usize).max(1);
        Self {
            duration,
            fps,
            frame_count,
        }
    }

    /// Source timestamp of sampled frame `index`.
    pub fn timestamp(&self, index: usize) -> f64 {
        self.clamp(index as f64 / self.fps)
    }

    /// Timestamp of the baseline frame, `offset_secs` before the end.
    pub fn baseline_timestamp(&self, offset_secs: f64) -> f64 {
        self.clamp(self.duration - offset_secs)
    }

    fn clamp(&self, t: f64) -> f64 {
        t.clamp(0.0, (self.duration - TIMESTAMP_EPSILON_SECS).max(0.0))
    }
}

/// Result of the first pass.
#[derive(Clone, Debug)]
pub struct AnalysisOutput {
    pub metrics: Vec<FrameMetrics>,
    /// Baseline at analysis resolution.
    pub baseline: Frame,
}

/// Streams every sampled frame once and measures it against the baseline and
/// the previous sample.
pub struct FrameAnalyzer<'a> {
    pub plan: SamplingPlan,
    pub size: FrameSize,
    pub thresholds: &'a ThresholdConfig,
    pub baseline_offset_secs: f64,
    pub progress_interval: usize,
}

impl FrameAnalyzer<'_> {
    /// Run the pass. `on_progress` receives the number of frames analysed so
    /// far, every `progress_interval` frames and always after the last one.
    ///
    /// Any decode failure aborts the pass.
    pub fn run<S, F>(&self, source: &mut S, mut on_progress: F) -> Result<AnalysisOutput>
    where
        S: FrameSource + ?Sized,
        F: FnMut(usize),
    {
        let baseline_time = self.plan.baseline_timestamp(self.baseline_offset_secs);
        let baseline = source.seek(baseline_time, self.size)?;
        debug!(time = baseline_time, size = %self.size, "Baseline frame decoded");

        let count = self.plan.frame_count;
        let interval = self.progress_interval.max(1);
        let mut metrics = Vec::with_capacity(count);
        let mut previous: Option<Frame> = None;

        for index in 0..count {
            let frame = source.seek(self.plan.timestamp(index), self.size)?;
            let baseline_ratio = changed_ratio(&frame, &baseline, self.thresholds.pixel_delta);
            let motion_ratio = previous
                .as_ref()
                .map(|prev| changed_ratio(&frame, prev, self.thresholds.motion))
                .unwrap_or(0.0);
            metrics.push(FrameMetrics {
                baseline_ratio,
                motion_ratio,
            });
            previous = Some(frame);

            let done = index + 1;
            if done % interval == 0 || done == count {
                on_progress(done);
            }
        }

        info!(frames = count, size = %self.size, "Frame analysis complete");
        Ok(AnalysisOutput { metrics, baseline })
    }
}
