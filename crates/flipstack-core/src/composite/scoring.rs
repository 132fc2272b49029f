use crate::analysis::pixel::{pixel_brightness, pixel_delta};
use crate::frame::Frame;
use crate::grid::GridCellRegion;
use crate::pipeline::config::{MergeConfig, ThresholdConfig};

/// What a cell's local motion is measured against.
#[derive(Clone, Copy, Debug)]
pub enum MotionReference<'a> {
    /// The previously composited frame.
    Frame(&'a Frame),
    /// No previous merge frame: reuse the frame's whole-frame motion ratio.
    Global(f32),
}

/// Statistics behind one accepted cell score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellScore {
    pub changed_ratio: f32,
    pub local_motion_ratio: f32,
    pub brightness_variance: f64,
    pub score: f64,
}

/// Scores a cell's evaluation rectangle for revealed card content.
#[derive(Clone, Copy, Debug)]
pub struct CellScorer<'a> {
    pub thresholds: &'a ThresholdConfig,
    pub merge: &'a MergeConfig,
}

impl CellScorer<'_> {
    /// Score `frame` inside `region`, or `None` when the cell shows too little
    /// change or too much motion (likely mid-flip).
    ///
    /// Rich card faces have more brightness variance than flat card backs;
    /// motion divides the score down.
    pub fn score(
        &self,
        frame: &Frame,
        region: &GridCellRegion,
        baseline: &Frame,
        reference: MotionReference<'_>,
    ) -> Option<CellScore> {
        let n = region.eval_pixel_count;
        if n == 0 {
            return None;
        }

        let mut changed = 0usize;
        let mut moving = 0usize;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;

        for (row, col) in region.eval_rect.pixels() {
            if pixel_delta(frame, baseline, row, col) > self.thresholds.pixel_delta {
                changed += 1;
            }
            if let MotionReference::Frame(previous) = reference {
                if pixel_delta(frame, previous, row, col) > self.thresholds.motion {
                    moving += 1;
                }
            }
            let b = pixel_brightness(frame, row, col) as f64;
            sum += b;
            sum_sq += b * b;
        }

        let changed_ratio = changed as f32 / n as f32;
        let local_motion_ratio = match reference {
            MotionReference::Frame(_) => moving as f32 / n as f32,
            MotionReference::Global(ratio) => ratio,
        };

        if changed_ratio < self.merge.min_reveal_ratio
            || local_motion_ratio > self.merge.max_local_motion_ratio
        {
            return None;
        }

        let mean = sum / n as f64;
        let brightness_variance = (sum_sq / n as f64 - mean * mean).max(0.0);
        let penalty =
            1.0 / (1.0 + local_motion_ratio as f64 * self.merge.motion_penalty_scale as f64);
        Some(CellScore {
            changed_ratio,
            local_motion_ratio,
            brightness_variance,
            score: changed_ratio as f64 * brightness_variance * penalty,
        })
    }
}
