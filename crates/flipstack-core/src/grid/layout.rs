use serde::{Deserialize, Serialize};

/// Outward padding of the copy rectangle, per edge, as a fraction of the
/// card's own width (left/right) or height (top/bottom).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopyPadding {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Default for CopyPadding {
    fn default() -> Self {
        Self {
            left: 0.04,
            top: 0.04,
            right: 0.04,
            bottom: 0.08,
        }
    }
}

impl CopyPadding {
    pub fn none() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: 0.0,
            bottom: 0.0,
        }
    }
}

/// Card placement expressed in fractions of the frame size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardLayout {
    pub left: f32,
    pub top: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub gap_x: f32,
    pub gap_y: f32,
    #[serde(default)]
    pub copy_padding: CopyPadding,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            left: 0.05,
            top: 0.2,
            card_width: 0.1,
            card_height: 0.2,
            gap_x: 0.02,
            gap_y: 0.05,
            copy_padding: CopyPadding::default(),
        }
    }
}

impl CardLayout {
    /// Fraction of the frame width covered by `cols` cards and their gaps,
    /// including the left offset.
    pub fn occupied_width(&self, cols: usize) -> f32 {
        occupied(self.left, self.card_width, self.gap_x, cols)
    }

    pub fn occupied_height(&self, rows: usize) -> f32 {
        occupied(self.top, self.card_height, self.gap_y, rows)
    }

    /// Whether this layout can be placed for a `rows` x `cols` grid.
    pub fn is_valid(&self, rows: usize, cols: usize) -> bool {
        let p = &self.copy_padding;
        let fields = [
            self.left,
            self.top,
            self.card_width,
            self.card_height,
            self.gap_x,
            self.gap_y,
            p.left,
            p.top,
            p.right,
            p.bottom,
        ];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return false;
        }
        if self.card_width <= 0.0 || self.card_height <= 0.0 {
            return false;
        }
        // Absorbs f32 rounding only: a layout that sums to exactly 1.0 in
        // decimal can land a few ulps above it. Any real overshoot fails.
        const SLACK: f32 = 1e-6;
        self.occupied_width(cols) <= 1.0 + SLACK && self.occupied_height(rows) <= 1.0 + SLACK
    }
}

fn occupied(offset: f32, size: f32, gap: f32, count: usize) -> f32 {
    let n = count as f32;
    offset + n * size + (n - 1.0).max(0.0) * gap
}

/// Board geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Percentage layout. `None` (or an invalid layout) means a uniform grid.
    pub layout: Option<CardLayout>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 8,
            layout: Some(CardLayout::default()),
        }
    }
}

impl GridConfig {
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}
