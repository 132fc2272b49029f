use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FlipstackError, Result};
use crate::grid::GridConfig;

/// Every tunable the pipeline reads. Built once, never mutated during a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub active_range: ActiveRangeConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub merge: MergeConfig,
    #[serde(default)]
    pub sharpening: SharpeningConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Analysis frames per second of video, independent of the source frame rate.
    pub fps: f64,
    /// Output resolution as a fraction of the source resolution.
    pub output_scale: f32,
    /// Resolution used for whole-frame analysis, as a fraction of the source.
    pub analysis_scale: f32,
    /// The baseline frame is taken this many seconds before the end.
    pub baseline_offset_secs: f64,
    /// Report progress every this many frames.
    pub progress_interval: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            fps: 6.0,
            output_scale: 1.0,
            analysis_scale: 0.25,
            baseline_offset_secs: 0.25,
            progress_interval: 5,
        }
    }
}

/// Per-pixel change thresholds on the 0..255 channel scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Delta from the baseline above which a pixel counts as changed.
    pub pixel_delta: f32,
    /// Delta from the previous frame above which a pixel counts as moving.
    pub motion: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            pixel_delta: 28.0,
            motion: 14.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveRangeConfig {
    pub min_baseline_ratio: f32,
    pub max_baseline_ratio: f32,
    pub min_motion_ratio: f32,
    /// Consecutive candidate frames needed before a run counts.
    pub min_active_streak: usize,
    /// Frames added on each side of the detected range.
    pub margin_frames: usize,
}

impl Default for ActiveRangeConfig {
    fn default() -> Self {
        Self {
            min_baseline_ratio: 0.015,
            max_baseline_ratio: 0.6,
            min_motion_ratio: 0.002,
            min_active_streak: 2,
            margin_frames: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Cells changed less than this (relative to baseline) are not scored.
    pub min_reveal_ratio: f32,
    /// Cells moving more than this are treated as mid-flip and skipped.
    pub max_local_motion_ratio: f32,
    /// Weight of local motion in the score penalty.
    pub motion_penalty_scale: f32,
    /// Ranked frames kept per cell for fallback filling.
    pub candidate_count: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_reveal_ratio: 0.08,
            max_local_motion_ratio: 0.35,
            motion_penalty_scale: 4.0,
            candidate_count: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharpeningConfig {
    /// Unsharp strength; zero or below disables sharpening.
    pub strength: f32,
}

impl Default for SharpeningConfig {
    fn default() -> Self {
        Self { strength: 0.35 }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| FlipstackError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FlipstackError::Config(e.to_string()))
    }

    /// Reject values the pipeline cannot run with. Card layouts are not checked
    /// here: an unusable layout falls back to a uniform grid.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(FlipstackError::Config(msg.to_string()));
        let s = &self.sampling;
        if !positive(s.fps) {
            return fail("sampling.fps must be positive");
        }
        if !positive(s.output_scale as f64) || !positive(s.analysis_scale as f64) {
            return fail("sampling scales must be positive");
        }
        if s.baseline_offset_secs.is_nan() || s.baseline_offset_secs < 0.0 {
            return fail("sampling.baseline_offset_secs must not be negative");
        }
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return fail("grid needs at least one row and one column");
        }
        if self.merge.candidate_count == 0 {
            return fail("merge.candidate_count must be at least 1");
        }
        let a = &self.active_range;
        if a.min_baseline_ratio > a.max_baseline_ratio {
            return fail("active_range.min_baseline_ratio exceeds max_baseline_ratio");
        }
        Ok(())
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

impl std::fmt::Display for ThresholdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "delta > {}, motion > {}", self.pixel_delta, self.motion)
    }
}

impl std::fmt::Display for ActiveRangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "baseline {:.3}..{:.3}, motion >= {:.3}, streak {}, margin {}",
            self.min_baseline_ratio,
            self.max_baseline_ratio,
            self.min_motion_ratio,
            self.min_active_streak,
            self.margin_frames
        )
    }
}
