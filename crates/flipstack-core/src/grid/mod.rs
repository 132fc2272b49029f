//! Card grid geometry: where each card sits in a frame, which pixels are
//! scored and which pixels are copied into the composite.

mod layout;
mod regions;

pub use layout::{CardLayout, CopyPadding, GridConfig};
pub use regions::{build_regions, uniform_regions};

use serde::{Deserialize, Serialize};

/// Integer pixel bounds, half-open on the right and bottom edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Row/column pairs covered by this rectangle, row-major.
    pub fn pixels(self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.left as usize..self.right as usize;
        (self.top as usize..self.bottom as usize)
            .flat_map(move |row| cols.clone().map(move |col| (row, col)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{},{} .. {},{})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Pixel regions for one card slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridCellRegion {
    /// Pixels written into the composite when this cell gets a new best frame.
    pub copy_rect: Rect,
    /// Inset area scored for reveal confidence.
    pub eval_rect: Rect,
    /// Cached `eval_rect.area()`.
    pub eval_pixel_count: usize,
}
