/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Minimum grid cell count to score cells of one frame in parallel.
pub const PARALLEL_CELL_THRESHOLD: usize = 4;

/// Number of color channels kept per pixel (R, G, B). Alpha is dropped on decode.
pub const CHANNELS: usize = 3;

/// Fraction of a cell's nominal size trimmed from every side to form the
/// evaluation rectangle. Keeps card borders and drop shadows out of the score.
pub const EVAL_INSET_FRACTION: f32 = 0.12;

/// Sampled timestamps are clamped to `duration - TIMESTAMP_EPSILON_SECS` so
/// the last sample never lands past the final decodable frame.
pub const TIMESTAMP_EPSILON_SECS: f64 = 1e-3;

/// Running-best sentinel; lower than any score a cell can produce.
pub const SCORE_SENTINEL: f64 = f64::NEG_INFINITY;

/// Active-range relaxation: motion must exceed this fraction of the peak
/// observed motion ratio.
pub const ACTIVE_RANGE_PEAK_MOTION_FACTOR: f32 = 0.35;

/// Active-range relaxation: multiplier applied to the minimum baseline ratio.
pub const ACTIVE_RANGE_BASELINE_FLOOR_FACTOR: f32 = 0.5;

/// Merge-frame relaxation: motion must exceed this fraction of the peak
/// observed motion ratio inside the active range.
pub const MERGE_FILTER_PEAK_MOTION_FACTOR: f32 = 0.5;

/// Merge-frame relaxation: multiplier applied to the minimum baseline ratio.
pub const MERGE_FILTER_BASELINE_FLOOR_FACTOR: f32 = 0.5;

/// Nominal frame rate assumed for SER files without a timestamp trailer.
pub const DEFAULT_SER_FRAME_RATE: f64 = 30.0;

/// SER timestamps count 100 ns ticks.
pub const SER_TICKS_PER_SECOND: f64 = 10_000_000.0;
