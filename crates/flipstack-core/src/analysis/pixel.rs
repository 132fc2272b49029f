use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::frame::Frame;

/// Mean absolute difference of the red, green and blue channels at one pixel.
#[inline]
pub fn pixel_delta(a: &Frame, b: &Frame, row: usize, col: usize) -> f32 {
    let mut sum = 0u32;
    for c in 0..3 {
        sum += a.data[[row, col, c]].abs_diff(b.data[[row, col, c]]) as u32;
    }
    sum as f32 / 3.0
}

/// Mean of the red, green and blue channels at one pixel.
#[inline]
pub fn pixel_brightness(frame: &Frame, row: usize, col: usize) -> f32 {
    let sum: u32 = (0..3).map(|c| frame.data[[row, col, c]] as u32).sum();
    sum as f32 / 3.0
}

/// Fraction of the whole frame whose delta exceeds `threshold`.
///
/// Both frames must have the same size.
pub fn changed_ratio(a: &Frame, b: &Frame, threshold: f32) -> f32 {
    let (h, w) = (a.height(), a.width());
    let total = h * w;
    if total == 0 {
        return 0.0;
    }
    let count_row = |row: usize| {
        (0..w)
            .filter(|&col| pixel_delta(a, b, row, col) > threshold)
            .count()
    };
    let changed: usize = if total >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(count_row).sum()
    } else {
        (0..h).map(count_row).sum()
    };
    changed as f32 / total as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameSize;
    use approx::assert_relative_eq;

    #[test]
    fn delta_is_symmetric() {
        let a = Frame::filled(FrameSize::new(1, 1), [10, 200, 30]);
        let b = Frame::filled(FrameSize::new(1, 1), [40, 170, 30]);
        assert_relative_eq!(pixel_delta(&a, &b, 0, 0), 20.0);
        assert_relative_eq!(pixel_delta(&b, &a, 0, 0), 20.0);
    }

    #[test]
    fn brightness_is_channel_mean() {
        let f = Frame::filled(FrameSize::new(1, 1), [0, 90, 30]);
        assert_relative_eq!(pixel_brightness(&f, 0, 0), 40.0);
    }

    #[test]
    fn changed_ratio_counts_strictly_above_threshold() {
        let size = FrameSize::new(4, 1);
        let base = Frame::filled(size, [0, 0, 0]);
        let mut other = base.clone();
        other.set_pixel(0, 0, [30, 30, 30]);
        other.set_pixel(0, 1, [31, 31, 31]);
        assert_relative_eq!(changed_ratio(&other, &base, 30.0), 0.25);
    }
}
