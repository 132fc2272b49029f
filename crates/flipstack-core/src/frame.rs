use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{s, Array3, ArrayView3};

use crate::consts::CHANNELS;
use crate::error::{FlipstackError, Result};
use crate::grid::Rect;

/// Width and height of a decoded frame, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions by `factor`, never going below one pixel.
    pub fn scaled(&self, factor: f32) -> Self {
        let scale = |v: u32| ((v as f32 * factor).round() as u32).max(1);
        Self {
            width: scale(self.width),
            height: scale(self.height),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single decoded RGB frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, shape = (height, width, 3), 8 bits per channel.
    pub data: Array3<u8>,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// Build a frame from tightly packed RGB24 bytes.
    pub fn from_rgb_bytes(width: u32, height: u32, bytes: Vec<u8>) -> Result<Self> {
        let shape = (height as usize, width as usize, CHANNELS);
        let data = Array3::from_shape_vec(shape, bytes)
            .map_err(|_| FlipstackError::InvalidDimensions { width, height })?;
        Ok(Self { data })
    }

    /// A frame filled with a single color.
    pub fn filled(size: FrameSize, rgb: [u8; 3]) -> Self {
        let mut data = Array3::<u8>::zeros((size.height as usize, size.width as usize, CHANNELS));
        for (c, &v) in rgb.iter().enumerate() {
            data.slice_mut(s![.., .., c]).fill(v);
        }
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width() as u32, self.height() as u32)
    }

    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        [
            self.data[[row, col, 0]],
            self.data[[row, col, 1]],
            self.data[[row, col, 2]],
        ]
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, rgb: [u8; 3]) {
        for (c, &v) in rgb.iter().enumerate() {
            self.data[[row, col, c]] = v;
        }
    }

    /// View of the pixels inside `rect`.
    pub fn region(&self, rect: &Rect) -> ArrayView3<'_, u8> {
        self.data.slice(s![
            rect.top as usize..rect.bottom as usize,
            rect.left as usize..rect.right as usize,
            ..
        ])
    }

    /// Overwrite the pixels inside `rect` with the same area of `source`.
    pub fn copy_region_from(&mut self, source: &Frame, rect: &Rect) {
        let src = source.region(rect);
        self.data
            .slice_mut(s![
                rect.top as usize..rect.bottom as usize,
                rect.left as usize..rect.right as usize,
                ..
            ])
            .assign(&src);
    }

    /// Resample to `size` with a triangle filter. Returns a clone when the
    /// size already matches.
    pub fn resized(&self, size: FrameSize) -> Frame {
        if self.size() == size {
            return self.clone();
        }
        let image = self.to_rgb_image();
        let resized = imageops::resize(&image, size.width, size.height, FilterType::Triangle);
        Frame::from_rgb_image(&resized)
    }

    pub fn from_rgb_image(image: &RgbImage) -> Frame {
        let (w, h) = image.dimensions();
        let data = Array3::from_shape_fn((h as usize, w as usize, CHANNELS), |(row, col, c)| {
            image.get_pixel(col as u32, row as u32).0[c]
        });
        Frame { data }
    }

    pub fn to_rgb_image(&self) -> RgbImage {
        let (h, w, _) = self.data.dim();
        RgbImage::from_fn(w as u32, h as u32, |col, row| {
            image::Rgb(self.pixel(row as usize, col as usize))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_size_never_collapses() {
        let size = FrameSize::new(10, 3).scaled(0.1);
        assert_eq!(size, FrameSize::new(1, 1));
    }

    #[test]
    fn copy_region_only_touches_rect() {
        let size = FrameSize::new(6, 4);
        let mut dst = Frame::filled(size, [0, 0, 0]);
        let src = Frame::filled(size, [9, 8, 7]);
        let rect = Rect::new(1, 1, 3, 2);
        dst.copy_region_from(&src, &rect);
        assert_eq!(dst.pixel(1, 1), [9, 8, 7]);
        assert_eq!(dst.pixel(1, 2), [9, 8, 7]);
        assert_eq!(dst.pixel(1, 3), [0, 0, 0]);
        assert_eq!(dst.pixel(0, 1), [0, 0, 0]);
    }

    #[test]
    fn resize_to_same_size_is_identity() {
        let frame = Frame::filled(FrameSize::new(5, 5), [1, 2, 3]);
        assert_eq!(frame.resized(FrameSize::new(5, 5)), frame);
    }

    #[test]
    fn rgb_bytes_must_match_shape() {
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 11]).is_err());
        assert!(Frame::from_rgb_bytes(2, 2, vec![0; 12]).is_ok());
    }
}
