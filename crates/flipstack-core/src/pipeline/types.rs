use std::sync::{Mutex, PoisonError};

use crate::analysis::{ActiveRange, RangeTier};
use crate::composite::{CardCandidate, CellState};
use crate::frame::{Frame, FrameSize};
use crate::io::image_io::EncodedImage;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Analysis,
    RangeDetection,
    Merging,
    FallbackFill,
    Sharpening,
    Encoding,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Analysis => write!(f, "Analysing frames"),
            Self::RangeDetection => write!(f, "Finding gameplay"),
            Self::Merging => write!(f, "Merging cards"),
            Self::FallbackFill => write!(f, "Filling gaps"),
            Self::Sharpening => write!(f, "Sharpening"),
            Self::Encoding => write!(f, "Encoding image"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// `progress` receives `current` out of a fixed `total` of twice the sampled
/// frame count: the first half covers analysis, the second half merging.
/// `current` never decreases within a run and ends at `total`.
pub trait ProgressReporter: Send + Sync {
    fn begin_stage(&self, _stage: PipelineStage) {}

    fn progress(&self, _current: usize, _total: usize) {}

    fn finish_stage(&self) {}
}

/// Ignores all progress.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Adapts a plain `(current, total)` callback.
pub struct FnReporter<F> {
    callback: Mutex<F>,
}

impl<F: FnMut(usize, usize) + Send> FnReporter<F> {
    pub fn new(callback: F) -> Self {
        Self {
            callback: Mutex::new(callback),
        }
    }
}

impl<F: FnMut(usize, usize) + Send> ProgressReporter for FnReporter<F> {
    fn progress(&self, current: usize, total: usize) {
        // A callback that panicked once must still see the final total.
        let mut callback = self.callback.lock().unwrap_or_else(PoisonError::into_inner);
        callback(current, total);
    }
}

/// Keeps reported progress monotonic across both passes.
pub(crate) struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    frame_count: usize,
    last: usize,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(reporter: &'a dyn ProgressReporter, frame_count: usize) -> Self {
        Self {
            reporter,
            frame_count,
            last: 0,
        }
    }

    pub(crate) fn total(&self) -> usize {
        2 * self.frame_count
    }

    pub(crate) fn report(&mut self, current: usize) {
        let current = current.clamp(self.last, self.total());
        self.last = current;
        self.reporter.progress(current, self.total());
    }

    /// `done` frames of the analysis pass finished.
    pub(crate) fn analysis(&mut self, done: usize) {
        self.report(done);
    }

    /// `done` of `merge_total` merge frames finished.
    pub(crate) fn merge(&mut self, done: usize, merge_total: usize) {
        let scaled = done * self.frame_count / merge_total.max(1);
        self.report(self.frame_count + scaled);
    }

    pub(crate) fn complete(&mut self) {
        self.report(self.total());
    }
}

/// How one grid cell was resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSummary {
    pub best_frame: Option<usize>,
    pub best_score: Option<f64>,
    pub candidates: Vec<CardCandidate>,
}

impl From<&CellState> for CellSummary {
    fn from(cell: &CellState) -> Self {
        Self {
            best_frame: cell.best_frame,
            best_score: cell.best_frame.map(|_| cell.best_score),
            candidates: cell.candidates.as_slice().to_vec(),
        }
    }
}

/// Diagnostics collected during one run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineReport {
    pub frame_count: usize,
    pub output_size: FrameSize,
    pub active_range: ActiveRange,
    pub range_tier: RangeTier,
    pub merge_frames: Vec<usize>,
    pub merge_tier: RangeTier,
    pub cells: Vec<CellSummary>,
    pub filled_pixels: usize,
    pub sharpened: bool,
}

impl PipelineReport {
    pub fn resolved_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.best_frame.is_some()).count()
    }
}

/// Result of a full run.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub image: EncodedImage,
    /// Final composite before encoding.
    pub composite: Frame,
    pub report: PipelineReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_never_goes_backwards() {
        let seen = Mutex::new(Vec::new());
        let reporter = FnReporter::new(|c, t| seen.lock().unwrap().push((c, t)));
        let mut tracker = ProgressTracker::new(&reporter, 10);

        tracker.report(0);
        tracker.analysis(5);
        tracker.analysis(3);
        tracker.analysis(10);
        tracker.merge(1, 4);
        tracker.merge(4, 4);
        tracker.complete();

        drop(reporter);
        let seen = seen.into_inner().unwrap();
        let currents: Vec<usize> = seen.iter().map(|&(c, _)| c).collect();
        assert_eq!(currents, vec![0, 5, 5, 10, 12, 20, 20]);
        assert!(seen.iter().all(|&(_, t)| t == 20));
    }

    #[test]
    fn empty_merge_still_completes() {
        let reporter = NoOpReporter;
        let mut tracker = ProgressTracker::new(&reporter, 3);
        tracker.merge(0, 0);
        assert_eq!(tracker.last, 3);
        tracker.complete();
        assert_eq!(tracker.last, tracker.total());
    }

    #[test]
    fn callback_keeps_receiving_after_a_panic() {
        use std::panic::{catch_unwind, AssertUnwindSafe};
        use std::sync::atomic::{AtomicUsize, Ordering};

        let last = AtomicUsize::new(0);
        let reporter = FnReporter::new(|current, _total| {
            if current == 1 {
                panic!("callback failed");
            }
            last.store(current, Ordering::SeqCst);
        });

        let outcome = catch_unwind(AssertUnwindSafe(|| reporter.progress(1, 4)));
        assert!(outcome.is_err());
        assert!(reporter.callback.is_poisoned());

        reporter.progress(4, 4);
        assert_eq!(last.load(Ordering::SeqCst), 4);
    }
}
