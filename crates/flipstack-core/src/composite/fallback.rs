use std::collections::HashMap;

use tracing::{debug, info};

use crate::analysis::pixel::pixel_delta;
use crate::analysis::SamplingPlan;
use crate::error::Result;
use crate::frame::{Frame, FrameSize};
use crate::grid::GridCellRegion;
use crate::io::source::FrameSource;

use super::compositor::CellState;

/// Decoded frames keyed by sampled frame index, so a runner-up shared by
/// several cells is decoded once.
pub struct FrameCache<'s, S: FrameSource + ?Sized> {
    source: &'s mut S,
    plan: SamplingPlan,
    size: FrameSize,
    frames: HashMap<usize, Frame>,
}

impl<'s, S: FrameSource + ?Sized> FrameCache<'s, S> {
    pub fn new(source: &'s mut S, plan: SamplingPlan, size: FrameSize) -> Self {
        Self {
            source,
            plan,
            size,
            frames: HashMap::new(),
        }
    }

    /// Decode `index` unless it is already cached.
    pub fn load(&mut self, index: usize) -> Result<()> {
        if !self.frames.contains_key(&index) {
            let frame = self.source.seek(self.plan.timestamp(index), self.size)?;
            self.frames.insert(index, frame);
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(&index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Patch composite pixels that still look like the baseline using each
/// cell's runner-up frames.
///
/// A pixel is unresolved when its delta from the baseline is at most
/// `threshold`; resolved pixels are never touched. For each unresolved pixel
/// the runners-up are tried best first and the first one that differs from the
/// baseline there wins. Returns the number of pixels patched.
pub fn fill_unresolved<S: FrameSource + ?Sized>(
    cache: &mut FrameCache<'_, S>,
    composite: &mut Frame,
    baseline: &Frame,
    regions: &[GridCellRegion],
    cells: &[CellState],
    threshold: f32,
) -> Result<usize> {
    let mut filled = 0usize;

    for (cell_index, (region, cell)) in regions.iter().zip(cells).enumerate() {
        if cell.candidates.len() < 2 {
            continue;
        }
        let runners_up = cell.candidates.runners_up();
        for candidate in runners_up {
            cache.load(candidate.frame_index)?;
        }
        let frames: Vec<&Frame> = runners_up
            .iter()
            .filter_map(|c| cache.get(c.frame_index))
            .collect();

        let mut cell_filled = 0usize;
        for (row, col) in region.copy_rect.pixels() {
            if pixel_delta(composite, baseline, row, col) > threshold {
                continue;
            }
            if let Some(frame) = frames
                .iter()
                .find(|f| pixel_delta(f, baseline, row, col) > threshold)
            {
                composite.set_pixel(row, col, frame.pixel(row, col));
                cell_filled += 1;
            }
        }
        if cell_filled > 0 {
            debug!(cell = cell_index, pixels = cell_filled, "Filled from runners-up");
        }
        filled += cell_filled;
    }

    info!(
        pixels = filled,
        decoded_frames = cache.len(),
        "Fallback fill complete"
    );
    Ok(filled)
}
