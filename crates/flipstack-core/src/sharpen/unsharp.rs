use ndarray::Array3;
use rayon::prelude::*;

use crate::consts::{CHANNELS, PARALLEL_PIXEL_THRESHOLD};
use crate::frame::Frame;

/// 3x3 unsharp kernel: center `1 + 4s`, four neighbours `-s`, per channel.
///
/// Border pixels are copied unchanged. Returns a copy of the input when
/// `strength <= 0` or the frame is smaller than 3x3.
pub fn sharpen(frame: &Frame, strength: f32) -> Frame {
    let (h, w, _) = frame.data.dim();
    if strength <= 0.0 || h < 3 || w < 3 {
        return frame.clone();
    }

    let data = &frame.data;
    let center = 1.0 + 4.0 * strength;
    let sharpen_row = |row: usize| -> Vec<u8> {
        let mut out = Vec::with_capacity((w - 2) * CHANNELS);
        for col in 1..w - 1 {
            for c in 0..CHANNELS {
                let neighbours = data[[row - 1, col, c]] as f32
                    + data[[row + 1, col, c]] as f32
                    + data[[row, col - 1, c]] as f32
                    + data[[row, col + 1, c]] as f32;
                let v = center * data[[row, col, c]] as f32 - strength * neighbours;
                out.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
        out
    };

    let rows: Vec<Vec<u8>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (1..h - 1).into_par_iter().map(sharpen_row).collect()
    } else {
        (1..h - 1).map(sharpen_row).collect()
    };

    let mut result: Array3<u8> = data.clone();
    for (i, row_data) in rows.into_iter().enumerate() {
        let row = i + 1;
        for (j, px) in row_data.chunks_exact(CHANNELS).enumerate() {
            for (c, &v) in px.iter().enumerate() {
                result[[row, j + 1, c]] = v;
            }
        }
    }
    Frame::new(result)
}
