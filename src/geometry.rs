//! Mapping between linear item indices and pixel positions inside a grid.
//!
//! Everything here is pure. Coordinates are relative to the zone's top-left
//! corner unless a function says otherwise.

use serde::{Deserialize, Serialize};

/// A point in zone-local or viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in the coordinate space of the viewport or scroll
/// ancestor, as reported by the host's layout measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            left,
            right: left + width,
            width,
            height,
        }
    }

    /// Strict containment: points on an edge belong to no zone.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x > self.left && x < self.right && y > self.top && y < self.bottom
    }
}

/// Column layout of a drop zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridSettings {
    pub column_width: f64,
    pub boxes_per_row: usize,
    pub row_height: f64,
}

impl GridSettings {
    /// Derive settings from a measured zone width. A zero width yields a
    /// zero column width, i.e. an unmeasured grid.
    pub fn measured(width: f64, boxes_per_row: usize, row_height: f64) -> Self {
        let boxes_per_row = boxes_per_row.max(1);
        let column_width = if width.is_finite() && width > 0.0 {
            width / boxes_per_row as f64
        } else {
            0.0
        };
        Self {
            column_width,
            boxes_per_row,
            row_height,
        }
    }

    /// Whether the zone has been laid out. Unmeasured grids render nothing
    /// and skip all index math.
    pub fn is_measured(&self) -> bool {
        self.column_width > 0.0
    }

    /// Number of rows needed to hold `item_count` items.
    pub fn rows_for(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.boxes_per_row.max(1))
    }
}

/// Pixel position of the slot at `index`.
///
/// `gap_at` is the live traversal target index of the zone, if any: every
/// slot at or after it moves one place further so the incoming item has
/// room to land.
pub fn position_for_index(index: usize, grid: &GridSettings, gap_at: Option<usize>) -> Point {
    let slot = match gap_at {
        Some(gap) if index >= gap => index + 1,
        _ => index,
    };
    let per_row = grid.boxes_per_row.max(1);
    let row = slot / per_row;
    let col = slot % per_row;
    Point::new(col as f64 * grid.column_width, row as f64 * grid.row_height)
}

/// Index of the slot nearest to zone-local `(x, y)`, clamped into the grid
/// and to `[0, item_count - 1]`. Returns `0` for an empty zone.
pub fn index_for_point(x: f64, y: f64, grid: &GridSettings, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    let per_row = grid.boxes_per_row.max(1);
    let last_row = grid.rows_for(item_count).saturating_sub(1);

    let col = nearest_track(x, grid.column_width, per_row - 1);
    let row = nearest_track(y, grid.row_height, last_row);

    (row * per_row + col).min(item_count - 1)
}

/// Index targeted by an item that started at `origin_index` and has been
/// dragged by `(dx, dy)` inside its own zone.
pub fn target_index_for_delta(
    origin_index: usize,
    grid: &GridSettings,
    item_count: usize,
    dx: f64,
    dy: f64,
) -> usize {
    let origin = position_for_index(origin_index, grid, None);
    index_for_point(origin.x + dx, origin.y + dy, grid, item_count)
}

// Rounds half up and clamps to `[0, max]`; degenerate track sizes pin to 0.
fn nearest_track(offset: f64, track: f64, max: usize) -> usize {
    if !(track > 0.0) || !offset.is_finite() {
        return 0;
    }
    let nearest = (offset / track + 0.5).floor();
    if nearest <= 0.0 {
        0
    } else {
        (nearest as usize).min(max)
    }
}
