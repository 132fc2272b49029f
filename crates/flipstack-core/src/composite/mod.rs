//! Second pass: per-cell scoring, best-frame compositing and runner-up
//! fallback filling.

pub mod candidates;
pub mod compositor;
pub mod fallback;
pub mod scoring;

pub use candidates::{CandidateList, CardCandidate};
pub use compositor::{composite_frames, CellCompositor, CellState, CompositeResult};
pub use fallback::{fill_unresolved, FrameCache};
pub use scoring::{CellScore, CellScorer, MotionReference};
