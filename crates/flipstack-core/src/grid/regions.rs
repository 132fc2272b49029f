use tracing::warn;

use crate::consts::EVAL_INSET_FRACTION;
use crate::frame::FrameSize;

use super::layout::{CardLayout, CopyPadding, GridConfig};
use super::{GridCellRegion, Rect};

/// Build one region per grid cell, row-major.
///
/// Uses the percentage layout when it is present and fits the frame,
/// otherwise partitions the frame evenly into `rows` x `cols` cells.
pub fn build_regions(size: FrameSize, grid: &GridConfig) -> Vec<GridCellRegion> {
    assert!(grid.rows >= 1 && grid.cols >= 1, "grid needs at least one cell");

    match grid.layout {
        Some(layout) if layout.is_valid(grid.rows, grid.cols) => {
            layout_regions(size, grid.rows, grid.cols, &layout)
        }
        Some(layout) => {
            warn!(
                occupied_width = layout.occupied_width(grid.cols),
                occupied_height = layout.occupied_height(grid.rows),
                "Card layout does not fit the frame, using uniform grid"
            );
            uniform_regions(size, grid.rows, grid.cols)
        }
        None => uniform_regions(size, grid.rows, grid.cols),
    }
}

/// Evenly partition the frame into `rows` x `cols` cells with no gaps and no
/// copy padding.
pub fn uniform_regions(size: FrameSize, rows: usize, cols: usize) -> Vec<GridCellRegion> {
    let (w, h) = (size.width as u64, size.height as u64);
    let mut regions = Vec::with_capacity(rows * cols);
    for row in 0..rows as u64 {
        let (top, bottom) = non_degenerate(
            (row * h / rows as u64) as u32,
            ((row + 1) * h / rows as u64) as u32,
            size.height,
        );
        for col in 0..cols as u64 {
            let (left, right) = non_degenerate(
                (col * w / cols as u64) as u32,
                ((col + 1) * w / cols as u64) as u32,
                size.width,
            );
            let nominal = Rect::new(left, top, right, bottom);
            regions.push(cell_region(nominal, nominal));
        }
    }
    regions
}

fn layout_regions(
    size: FrameSize,
    rows: usize,
    cols: usize,
    layout: &CardLayout,
) -> Vec<GridCellRegion> {
    let (w, h) = (size.width as f32, size.height as f32);
    let mut regions = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let y0 = layout.top + row as f32 * (layout.card_height + layout.gap_y);
        let (top, bottom) = non_degenerate(
            to_pixel(y0, h, size.height),
            to_pixel(y0 + layout.card_height, h, size.height),
            size.height,
        );
        for col in 0..cols {
            let x0 = layout.left + col as f32 * (layout.card_width + layout.gap_x);
            let (left, right) = non_degenerate(
                to_pixel(x0, w, size.width),
                to_pixel(x0 + layout.card_width, w, size.width),
                size.width,
            );
            let nominal = Rect::new(left, top, right, bottom);
            let copy = pad(&nominal, &layout.copy_padding, size);
            regions.push(cell_region(nominal, copy));
        }
    }
    regions
}

fn cell_region(nominal: Rect, copy_rect: Rect) -> GridCellRegion {
    let eval_rect = inset(&nominal, EVAL_INSET_FRACTION);
    GridCellRegion {
        copy_rect,
        eval_rect,
        eval_pixel_count: eval_rect.area(),
    }
}

fn to_pixel(fraction: f32, extent: f32, max: u32) -> u32 {
    ((fraction * extent).round().max(0.0) as u32).min(max)
}

/// Clamp `[start, end)` into `[0, max)` and guarantee at least one pixel.
fn non_degenerate(start: u32, end: u32, max: u32) -> (u32, u32) {
    let start = start.min(max.saturating_sub(1));
    let end = end.clamp(start + 1, max.max(start + 1));
    (start, end)
}

/// Shrink by `fraction` of the rectangle's size on every side, keeping at
/// least one pixel in each direction.
fn inset(rect: &Rect, fraction: f32) -> Rect {
    let dx = (rect.width() as f32 * fraction).floor() as u32;
    let dy = (rect.height() as f32 * fraction).floor() as u32;
    let (left, right) = shrink(rect.left, rect.right, dx);
    let (top, bottom) = shrink(rect.top, rect.bottom, dy);
    Rect::new(left, top, right, bottom)
}

fn shrink(start: u32, end: u32, by: u32) -> (u32, u32) {
    if end - start > 2 * by {
        (start + by, end - by)
    } else {
        let mid = start + (end - start) / 2;
        (mid, mid + 1)
    }
}

fn pad(rect: &Rect, padding: &CopyPadding, size: FrameSize) -> Rect {
    let w = rect.width() as f32;
    let h = rect.height() as f32;
    let grow = |fraction: f32, extent: f32| (fraction * extent).round() as u32;
    Rect::new(
        rect.left.saturating_sub(grow(padding.left, w)),
        rect.top.saturating_sub(grow(padding.top, h)),
        (rect.right + grow(padding.right, w)).min(size.width),
        (rect.bottom + grow(padding.bottom, h)).min(size.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shrink_keeps_one_pixel() {
        assert_eq!(shrink(10, 11, 3), (10, 11));
        assert_eq!(shrink(10, 14, 2), (12, 13));
        assert_eq!(shrink(0, 100, 12), (12, 88));
    }

    #[test]
    fn non_degenerate_at_frame_edge() {
        assert_eq!(non_degenerate(50, 50, 50), (49, 50));
        assert_eq!(non_degenerate(3, 3, 10), (3, 4));
        assert_eq!(non_degenerate(0, 7, 10), (0, 7));
    }

    #[test]
    fn padding_is_clamped_to_frame() {
        let rect = Rect::new(0, 0, 10, 10);
        let padded = pad(&rect, &CopyPadding::default(), FrameSize::new(10, 10));
        assert_eq!(padded, rect);
    }
}
