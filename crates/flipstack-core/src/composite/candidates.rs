use serde::{Deserialize, Serialize};

/// A frame that scored well for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardCandidate {
    pub frame_index: usize,
    pub score: f64,
}

/// Top-K candidates for one cell, best first, one entry per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateList {
    capacity: usize,
    entries: Vec<CardCandidate>,
}

impl CandidateList {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity + 1),
        }
    }

    /// Record a score for `frame_index`. A repeated frame keeps its higher
    /// score; the list is then re-sorted and cut back to capacity.
    pub fn insert(&mut self, frame_index: usize, score: f64) {
        match self.entries.iter_mut().find(|c| c.frame_index == frame_index) {
            Some(existing) => existing.score = existing.score.max(score),
            None => self.entries.push(CardCandidate { frame_index, score }),
        }
        // Ties go to the earlier frame so runs stay reproducible.
        self.entries.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.frame_index.cmp(&b.frame_index))
        });
        self.entries.truncate(self.capacity);
    }

    pub fn as_slice(&self) -> &[CardCandidate] {
        &self.entries
    }

    pub fn best(&self) -> Option<&CardCandidate> {
        self.entries.first()
    }

    /// Everything after the best entry, still in descending score order.
    pub fn runners_up(&self) -> &[CardCandidate] {
        self.entries.get(1..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
