//! Grid data model for the dashboard canvas.
//!
//! Everything here is expressed in **grid units**, the atomic coordinate of
//! the canvas. Only `DragUpdate` carries pixel offsets, because a drag preview
//! follows the finger before it is snapped back onto the grid.

use crate::id::WidgetId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Positions & Sizes ───────────────────────────────────────────────────

/// Top-left corner of a widget in grid units.
///
/// May be negative transiently while a resize anchors the opposite corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    pub col: i32,
    pub row: i32,
}

impl GridPosition {
    pub const ORIGIN: Self = Self { col: 0, row: 0 };

    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }
}

/// Widget footprint in grid units. Callers keep both dimensions > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width_units: i32,
    pub height_units: i32,
}

impl GridSize {
    pub const fn new(width_units: i32, height_units: i32) -> Self {
        Self {
            width_units,
            height_units,
        }
    }
}

/// Axis-aligned integer rectangle; `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl GridRect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The rectangle a widget of `size` covers when placed at `position`.
    pub const fn from_placement(position: GridPosition, size: GridSize) -> Self {
        Self {
            left: position.col,
            top: position.row,
            right: position.col + size.width_units,
            bottom: position.row + size.height_units,
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Open-interval intersection: rectangles that only share an edge do not
    /// intersect.
    pub const fn intersects(&self, other: &GridRect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }

    /// `other` lies entirely within `self` (edges may coincide).
    pub const fn contains_rect(&self, other: &GridRect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }
}

// ─── Boundaries ──────────────────────────────────────────────────────────

/// A region placements must not straddle: a display fold seam, or the
/// viewport of the alternate orientation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub name: String,
    pub rect: GridRect,
}

impl Boundary {
    pub fn new(name: impl Into<String>, rect: GridRect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }
}

/// Snapshot of the active boundaries. Devices rarely expose more than a fold
/// and one alternate viewport, so this stays inline.
pub type BoundarySet = SmallVec<[Boundary; 4]>;

// ─── Placements ──────────────────────────────────────────────────────────

/// One widget instance on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub instance_id: WidgetId,
    pub position: GridPosition,
    pub size: GridSize,
    pub z_index: i32,
}

impl Placement {
    pub fn rect(&self) -> GridRect {
        GridRect::from_placement(self.position, self.size)
    }
}

// ─── Transient manipulation state ────────────────────────────────────────

/// Live drag preview. Offsets are in pixels relative to where the drag began.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragUpdate {
    pub widget_id: WidgetId,
    pub current_offset_x: f32,
    pub current_offset_y: f32,
    pub is_dragging: bool,
}

/// Corner a resize gesture is grabbing. The opposite corner stays fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeHandle {
    /// Whether dragging this handle moves the widget's left edge.
    pub const fn moves_left_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    /// Whether dragging this handle moves the widget's top edge.
    pub const fn moves_top_edge(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// Live resize preview.
///
/// `target_position` is `Some` only for handles other than `BottomRight`,
/// where the widget origin has to shift to keep the opposite corner still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeUpdate {
    pub widget_id: WidgetId,
    pub handle: ResizeHandle,
    pub target_size: GridSize,
    pub target_position: Option<GridPosition>,
    pub is_resizing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = GridRect::new(0, 0, 4, 4);
        let right = GridRect::new(4, 0, 8, 4);
        let below = GridRect::new(0, 4, 4, 8);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(a.intersects(&GridRect::new(3, 3, 5, 5)));
    }

    #[test]
    fn rect_from_placement() {
        let rect = GridRect::from_placement(GridPosition::new(2, 4), GridSize::new(6, 2));
        assert_eq!(rect, GridRect::new(2, 4, 8, 6));
        assert_eq!(rect.width(), 6);
        assert_eq!(rect.height(), 2);
    }

    #[test]
    fn contains_rect_allows_shared_edges() {
        let outer = GridRect::new(0, 0, 10, 12);
        assert!(outer.contains_rect(&GridRect::new(0, 0, 10, 12)));
        assert!(outer.contains_rect(&GridRect::new(6, 2, 10, 4)));
        assert!(!outer.contains_rect(&GridRect::new(8, 0, 12, 4)));
    }

    #[test]
    fn handle_edges() {
        assert!(ResizeHandle::TopLeft.moves_left_edge());
        assert!(ResizeHandle::TopLeft.moves_top_edge());
        assert!(!ResizeHandle::BottomRight.moves_left_edge());
        assert!(!ResizeHandle::BottomRight.moves_top_edge());
        assert!(ResizeHandle::TopRight.moves_top_edge());
        assert!(!ResizeHandle::TopRight.moves_left_edge());
    }
}
