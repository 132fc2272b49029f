use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{
    ACTIVE_RANGE_BASELINE_FLOOR_FACTOR, ACTIVE_RANGE_PEAK_MOTION_FACTOR,
    MERGE_FILTER_BASELINE_FLOOR_FACTOR, MERGE_FILTER_PEAK_MOTION_FACTOR,
};
use crate::pipeline::config::ActiveRangeConfig;

use super::analyzer::FrameMetrics;

/// Inclusive window of sampled frame indices judged to contain gameplay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRange {
    pub start: usize,
    pub end: usize,
}

impl ActiveRange {
    pub fn frame_count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl std::fmt::Display for ActiveRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Which rule produced a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeTier {
    Strict,
    Relaxed,
    Everything,
}

impl std::fmt::Display for RangeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Relaxed => write!(f, "motion-relaxed"),
            Self::Everything => write!(f, "all frames"),
        }
    }
}

/// How the motion-based fallback predicate loosens the strict one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Relaxation {
    /// Motion must exceed this fraction of the peak motion ratio.
    pub peak_motion_factor: f32,
    /// Multiplier on `min_baseline_ratio`.
    pub baseline_floor_factor: f32,
}

impl Relaxation {
    pub const ACTIVE_RANGE: Self = Self {
        peak_motion_factor: ACTIVE_RANGE_PEAK_MOTION_FACTOR,
        baseline_floor_factor: ACTIVE_RANGE_BASELINE_FLOOR_FACTOR,
    };

    pub const MERGE_FILTER: Self = Self {
        peak_motion_factor: MERGE_FILTER_PEAK_MOTION_FACTOR,
        baseline_floor_factor: MERGE_FILTER_BASELINE_FLOOR_FACTOR,
    };

    /// Build the relaxed predicate for the frames in `window`.
    pub fn predicate(
        &self,
        window: &[FrameMetrics],
        config: &ActiveRangeConfig,
    ) -> impl Fn(&FrameMetrics) -> bool {
        let peak = window.iter().map(|m| m.motion_ratio).fold(0.0f32, f32::max);
        let motion_floor = config.min_motion_ratio.max(self.peak_motion_factor * peak);
        let baseline_floor = config.min_baseline_ratio * self.baseline_floor_factor;
        move |m: &FrameMetrics| m.motion_ratio > motion_floor && m.baseline_ratio >= baseline_floor
    }
}

/// Baseline ratio inside the accepted band.
pub fn in_baseline_band(m: &FrameMetrics, config: &ActiveRangeConfig) -> bool {
    m.baseline_ratio >= config.min_baseline_ratio && m.baseline_ratio <= config.max_baseline_ratio
}

/// Frame looks like active gameplay: some cards up, something moving.
pub fn is_active_candidate(m: &FrameMetrics, config: &ActiveRangeConfig) -> bool {
    in_baseline_band(m, config) && m.motion_ratio >= config.min_motion_ratio
}

/// Try `attempt` with the strict predicate, then the relaxed one, then give up
/// and take `everything`.
pub fn select_with_relaxation<T>(
    strict: &dyn Fn(&FrameMetrics) -> bool,
    relaxed: &dyn Fn(&FrameMetrics) -> bool,
    attempt: impl Fn(&dyn Fn(&FrameMetrics) -> bool) -> Option<T>,
    everything: impl FnOnce() -> T,
) -> (T, RangeTier) {
    if let Some(found) = attempt(strict) {
        return (found, RangeTier::Strict);
    }
    if let Some(found) = attempt(relaxed) {
        return (found, RangeTier::Relaxed);
    }
    (everything(), RangeTier::Everything)
}

/// First and last frame of any run of at least `min_streak` consecutive
/// matches, widened by `margin` on both sides.
pub fn confirmed_range(
    metrics: &[FrameMetrics],
    predicate: &dyn Fn(&FrameMetrics) -> bool,
    min_streak: usize,
    margin: usize,
) -> Option<ActiveRange> {
    let min_streak = min_streak.max(1);
    let mut run = 0usize;
    let mut first = None;
    let mut last = None;

    for (i, m) in metrics.iter().enumerate() {
        if predicate(m) {
            run += 1;
            if run >= min_streak {
                first.get_or_insert(i + 1 - run);
                last = Some(i);
            }
        } else {
            run = 0;
        }
    }

    let (first, last) = (first?, last?);
    Some(ActiveRange {
        start: first.saturating_sub(margin),
        end: (last + margin).min(metrics.len() - 1),
    })
}

/// Find the gameplay window. Never empty: falls back to the whole sequence.
///
/// `metrics` must hold at least one frame.
pub fn detect_active_range(
    metrics: &[FrameMetrics],
    config: &ActiveRangeConfig,
) -> (ActiveRange, RangeTier) {
    debug_assert!(!metrics.is_empty());
    let strict = |m: &FrameMetrics| is_active_candidate(m, config);
    let relaxed = Relaxation::ACTIVE_RANGE.predicate(metrics, config);

    let (range, tier) = select_with_relaxation(
        &strict,
        &relaxed,
        |predicate| {
            confirmed_range(
                metrics,
                predicate,
                config.min_active_streak,
                config.margin_frames,
            )
        },
        || ActiveRange {
            start: 0,
            end: metrics.len().saturating_sub(1),
        },
    );

    if tier == RangeTier::Everything {
        warn!(frames = metrics.len(), "No gameplay detected, using every frame");
    }
    info!(range = %range, tier = %tier, "Active range selected");
    (range, tier)
}

/// Frames inside `range` worth compositing. Never empty.
pub fn merge_frame_indices(
    metrics: &[FrameMetrics],
    range: ActiveRange,
    config: &ActiveRangeConfig,
) -> (Vec<usize>, RangeTier) {
    let window = &metrics[range.start..=range.end];
    let strict = |m: &FrameMetrics| in_baseline_band(m, config);
    let relaxed = Relaxation::MERGE_FILTER.predicate(window, config);

    let (indices, tier) = select_with_relaxation(
        &strict,
        &relaxed,
        |predicate| {
            let picked: Vec<usize> = range.indices().filter(|&i| predicate(&metrics[i])).collect();
            (!picked.is_empty()).then_some(picked)
        },
        || range.indices().collect(),
    );
    info!(frames = indices.len(), tier = %tier, "Merge frames selected");
    (indices, tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(baseline_ratio: f32, motion_ratio: f32) -> FrameMetrics {
        FrameMetrics {
            baseline_ratio,
            motion_ratio,
        }
    }

    #[test]
    fn single_frame_blips_do_not_count() {
        let metrics = vec![m(0.0, 0.0), m(0.1, 0.1), m(0.0, 0.0), m(0.1, 0.1), m(0.0, 0.0)];
        let strict = |f: &FrameMetrics| f.baseline_ratio > 0.0;
        assert_eq!(confirmed_range(&metrics, &strict, 2, 0), None);
        assert_eq!(
            confirmed_range(&metrics, &strict, 1, 0),
            Some(ActiveRange { start: 1, end: 3 })
        );
    }

    #[test]
    fn margin_is_clamped() {
        let metrics = vec![m(0.1, 0.1), m(0.1, 0.1), m(0.0, 0.0)];
        let strict = |f: &FrameMetrics| f.baseline_ratio > 0.0;
        assert_eq!(
            confirmed_range(&metrics, &strict, 2, 5),
            Some(ActiveRange { start: 0, end: 2 })
        );
    }

    #[test]
    fn relaxed_tier_uses_peak_motion() {
        let config = ActiveRangeConfig::default();
        // Baseline ratios above the band: strict rule never matches.
        let mut metrics = vec![m(0.9, 0.0); 10];
        for f in metrics.iter_mut().skip(3).take(4) {
            f.motion_ratio = 0.2;
        }
        let (range, tier) = detect_active_range(&metrics, &config);
        assert_eq!(tier, RangeTier::Relaxed);
        assert_eq!(range, ActiveRange { start: 1, end: 8 });
    }

    #[test]
    fn merge_filter_keeps_band_frames_only() {
        let config = ActiveRangeConfig::default();
        let metrics = vec![m(0.0, 0.0), m(0.05, 0.0), m(0.9, 0.0), m(0.05, 0.01)];
        let range = ActiveRange { start: 0, end: 3 };
        let (indices, tier) = merge_frame_indices(&metrics, range, &config);
        assert_eq!(tier, RangeTier::Strict);
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn merge_filter_falls_back_to_whole_range() {
        let config = ActiveRangeConfig::default();
        let metrics = vec![m(0.0, 0.0); 6];
        let range = ActiveRange { start: 2, end: 4 };
        let (indices, tier) = merge_frame_indices(&metrics, range, &config);
        assert_eq!(tier, RangeTier::Everything);
        assert_eq!(indices, vec![2, 3, 4]);
    }
}
