use rayon::prelude::*;
use tracing::{debug, info};

use crate::analysis::{FrameMetrics, SamplingPlan};
use crate::consts::{PARALLEL_CELL_THRESHOLD, SCORE_SENTINEL};
use crate::error::Result;
use crate::frame::{Frame, FrameSize};
use crate::grid::GridCellRegion;
use crate::io::source::FrameSource;

use super::candidates::CandidateList;
use super::scoring::{CellScore, CellScorer, MotionReference};

/// Running state for one grid cell.
#[derive(Clone, Debug)]
pub struct CellState {
    pub best_score: f64,
    pub best_frame: Option<usize>,
    pub candidates: CandidateList,
}

impl CellState {
    pub fn new(candidate_count: usize) -> Self {
        Self {
            best_score: SCORE_SENTINEL,
            best_frame: None,
            candidates: CandidateList::new(candidate_count),
        }
    }

    /// Fold one accepted score in. Returns `true` when it beats the running best.
    pub fn offer(&mut self, frame_index: usize, score: f64) -> bool {
        self.candidates.insert(frame_index, score);
        if score > self.best_score {
            self.best_score = score;
            self.best_frame = Some(frame_index);
            true
        } else {
            false
        }
    }
}

/// Output of the merge pass.
#[derive(Clone, Debug)]
pub struct CompositeResult {
    pub composite: Frame,
    pub cells: Vec<CellState>,
}

/// Builds the composite from merge frames fed in index order.
pub struct CellCompositor<'a> {
    regions: &'a [GridCellRegion],
    baseline: &'a Frame,
    scorer: CellScorer<'a>,
    composite: Frame,
    cells: Vec<CellState>,
    previous: Option<Frame>,
}

impl<'a> CellCompositor<'a> {
    /// Start from the baseline; every cell begins unresolved.
    pub fn new(
        regions: &'a [GridCellRegion],
        baseline: &'a Frame,
        scorer: CellScorer<'a>,
        candidate_count: usize,
    ) -> Self {
        Self {
            regions,
            baseline,
            scorer,
            composite: baseline.clone(),
            cells: vec![CellState::new(candidate_count); regions.len()],
            previous: None,
        }
    }

    /// Score every cell of `frame` against the baseline.
    ///
    /// `global_motion` stands in for local motion until a previous merge frame
    /// exists.
    pub fn score_frame(&self, frame: &Frame, global_motion: f32) -> Vec<Option<CellScore>> {
        let reference = match &self.previous {
            Some(prev) => MotionReference::Frame(prev),
            None => MotionReference::Global(global_motion),
        };
        let score = |region: &GridCellRegion| {
            self.scorer.score(frame, region, self.baseline, reference)
        };
        if self.regions.len() >= PARALLEL_CELL_THRESHOLD {
            self.regions.par_iter().map(score).collect()
        } else {
            self.regions.iter().map(score).collect()
        }
    }

    /// Fold one merge frame into the composite. Returns how many cells got a
    /// new best.
    pub fn add_frame(&mut self, frame_index: usize, frame: Frame, global_motion: f32) -> usize {
        let scores = self.score_frame(&frame, global_motion);
        let mut improved = 0;
        for ((cell, region), score) in self.cells.iter_mut().zip(self.regions).zip(scores) {
            let Some(score) = score else { continue };
            if cell.offer(frame_index, score.score) {
                self.composite.copy_region_from(&frame, &region.copy_rect);
                improved += 1;
            }
        }
        self.previous = Some(frame);
        improved
    }

    pub fn finish(self) -> CompositeResult {
        CompositeResult {
            composite: self.composite,
            cells: self.cells,
        }
    }
}

/// Decode `merge_frames` in order at `size` and fold them into a compositor.
///
/// `on_progress` gets the number of merge frames processed so far.
#[allow(clippy::too_many_arguments)]
pub fn composite_frames<S, F>(
    source: &mut S,
    plan: &SamplingPlan,
    size: FrameSize,
    merge_frames: &[usize],
    metrics: &[FrameMetrics],
    mut compositor: CellCompositor<'_>,
    progress_interval: usize,
    mut on_progress: F,
) -> Result<CompositeResult>
where
    S: FrameSource + ?Sized,
    F: FnMut(usize),
{
    let interval = progress_interval.max(1);
    for (done, &index) in merge_frames.iter().enumerate() {
        let frame = source.seek(plan.timestamp(index), size)?;
        let improved = compositor.add_frame(index, frame, metrics[index].motion_ratio);
        if improved > 0 {
            debug!(frame = index, cells = improved, "New best cells");
        }
        let done = done + 1;
        if done % interval == 0 || done == merge_frames.len() {
            on_progress(done);
        }
    }

    let result = compositor.finish();
    let resolved = result.cells.iter().filter(|c| c.best_frame.is_some()).count();
    info!(
        frames = merge_frames.len(),
        resolved_cells = resolved,
        cells = result.cells.len(),
        "Cell compositing complete"
    );
    Ok(result)
}
