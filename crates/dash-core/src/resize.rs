//! Corner-handle resize geometry.
//!
//! Dragging a handle changes the widget size in `SNAP_UNIT` steps while the
//! corner opposite the handle stays where it was. Only `BottomRight` keeps
//! the origin, so it is the only handle that reports no target position.

use crate::model::{GridPosition, GridSize, ResizeHandle};
use crate::placement::SNAP_UNIT;

/// Target size and, for handles that move the origin, target position for a
/// resize that has been dragged `(dx_px, dy_px)` pixels from its start.
///
/// The size never drops below `min_size`; when it is clamped the anchored
/// corner still does not move.
pub fn resize_geometry(
    handle: ResizeHandle,
    origin: GridPosition,
    size: GridSize,
    dx_px: f32,
    dy_px: f32,
    grid_unit_px: f32,
    min_size: GridSize,
) -> (GridSize, Option<GridPosition>) {
    let dcol = snap_delta(dx_px, grid_unit_px);
    let drow = snap_delta(dy_px, grid_unit_px);

    let width = if handle.moves_left_edge() {
        size.width_units - dcol
    } else {
        size.width_units + dcol
    };
    let height = if handle.moves_top_edge() {
        size.height_units - drow
    } else {
        size.height_units + drow
    };
    let target = GridSize::new(
        width.max(min_size.width_units),
        height.max(min_size.height_units),
    );

    if handle == ResizeHandle::BottomRight {
        return (target, None);
    }

    let right = origin.col + size.width_units;
    let bottom = origin.row + size.height_units;
    let col = if handle.moves_left_edge() {
        right - target.width_units
    } else {
        origin.col
    };
    let row = if handle.moves_top_edge() {
        bottom - target.height_units
    } else {
        origin.row
    };
    (target, Some(GridPosition::new(col, row)))
}

/// Pixel delta → whole `SNAP_UNIT` steps, symmetric around zero so that
/// shrinking responds exactly like growing.
fn snap_delta(pixels: f32, grid_unit_px: f32) -> i32 {
    if !(grid_unit_px.is_finite() && grid_unit_px > 0.0) {
        return 0;
    }
    let raw = ((pixels / grid_unit_px).round() as i32).clamp(-(i32::MAX - 1), i32::MAX - 1);
    let magnitude = ((raw.abs() + 1) / SNAP_UNIT) * SNAP_UNIT;
    raw.signum() * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridRect;
    use pretty_assertions::assert_eq;

    const UNIT: f32 = 16.0;
    const MIN: GridSize = GridSize::new(2, 2);

    fn origin() -> GridPosition {
        GridPosition::new(4, 4)
    }

    fn size() -> GridSize {
        GridSize::new(4, 4)
    }

    #[test]
    fn bottom_right_grows_without_moving() {
        let (target, position) = resize_geometry(
            ResizeHandle::BottomRight,
            origin(),
            size(),
            32.0,
            64.0,
            UNIT,
            MIN,
        );
        assert_eq!(target, GridSize::new(6, 8));
        assert_eq!(position, None);
    }

    #[test]
    fn top_left_keeps_bottom_right_corner() {
        let (target, position) = resize_geometry(
            ResizeHandle::TopLeft,
            origin(),
            size(),
            -32.0,
            -32.0,
            UNIT,
            MIN,
        );
        assert_eq!(target, GridSize::new(6, 6));
        let position = position.unwrap();
        assert_eq!(position, GridPosition::new(2, 2));
        let before = GridRect::from_placement(origin(), size());
        let after = GridRect::from_placement(position, target);
        assert_eq!((after.right, after.bottom), (before.right, before.bottom));
    }

    #[test]
    fn top_right_keeps_bottom_left_corner() {
        let (target, position) = resize_geometry(
            ResizeHandle::TopRight,
            origin(),
            size(),
            32.0,
            -32.0,
            UNIT,
            MIN,
        );
        assert_eq!(target, GridSize::new(6, 6));
        assert_eq!(position, Some(GridPosition::new(4, 2)));
    }

    #[test]
    fn bottom_left_keeps_top_right_corner() {
        let (target, position) = resize_geometry(
            ResizeHandle::BottomLeft,
            origin(),
            size(),
            -32.0,
            32.0,
            UNIT,
            MIN,
        );
        assert_eq!(target, GridSize::new(6, 6));
        assert_eq!(position, Some(GridPosition::new(2, 4)));
    }

    #[test]
    fn shrinking_stops_at_minimum_with_anchor_intact() {
        let (target, position) = resize_geometry(
            ResizeHandle::TopLeft,
            origin(),
            size(),
            200.0,
            200.0,
            UNIT,
            MIN,
        );
        assert_eq!(target, MIN);
        // bottom-right corner (8, 8) is unchanged
        assert_eq!(position, Some(GridPosition::new(6, 6)));
    }

    #[test]
    fn shrink_and_grow_are_symmetric() {
        assert_eq!(snap_delta(32.0, UNIT), 2);
        assert_eq!(snap_delta(-32.0, UNIT), -2);
        assert_eq!(snap_delta(-48.0, UNIT), -4);
        assert_eq!(snap_delta(4.0, UNIT), 0);
        assert_eq!(snap_delta(10.0, 0.0), 0);
    }

    #[test]
    fn handle_position_is_reported_even_without_change() {
        let (target, position) = resize_geometry(
            ResizeHandle::TopRight,
            origin(),
            size(),
            0.0,
            0.0,
            UNIT,
            MIN,
        );
        assert_eq!(target, size());
        assert_eq!(position, Some(origin()));
    }
}
