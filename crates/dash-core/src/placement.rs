//! Grid placement engine.
//!
//! Pure, total functions that pick, snap and validate widget rectangles:
//!
//! - `find_optimal_position`: centre-biased search for a free slot
//! - `snap_to_grid`: pixel offsets → `SNAP_UNIT`-aligned grid position
//! - `enforce_no_straddle`: push a rectangle fully inside or outside each
//!   boundary
//! - `has_overlap` / `straddles_boundary`: the predicates both of the above
//!   are built on
//!
//! Nothing here allocates beyond the candidate list and nothing can fail: the
//! worst case of the search is extending the canvas downward.

use crate::id::WidgetId;
use crate::model::{Boundary, GridPosition, GridRect, GridSize, Placement};

/// Committed positions are multiples of this many grid units on both axes.
pub const SNAP_UNIT: i32 = 2;

// ─── Predicates ──────────────────────────────────────────────────────────

/// Open-interval overlap: touching edges is not overlap.
pub fn has_overlap(a: &GridRect, b: &GridRect) -> bool {
    a.intersects(b)
}

/// `rect` partially covers `boundary`, neither fully inside nor fully outside.
pub fn straddles_boundary(rect: &GridRect, boundary: &Boundary) -> bool {
    rect.intersects(&boundary.rect) && !boundary.rect.contains_rect(rect)
}

/// Whether `rect` overlaps any placement other than `ignore`.
pub fn overlaps_any(rect: &GridRect, placements: &[Placement], ignore: Option<WidgetId>) -> bool {
    placements
        .iter()
        .filter(|p| Some(p.instance_id) != ignore)
        .any(|p| has_overlap(rect, &p.rect()))
}

/// Whether `rect` straddles any of `boundaries`.
pub fn straddles_any(rect: &GridRect, boundaries: &[Boundary]) -> bool {
    boundaries.iter().any(|b| straddles_boundary(rect, b))
}

// ─── Search ──────────────────────────────────────────────────────────────

/// Find the free slot for a new widget closest to the viewport centre.
///
/// Candidates are every origin where the widget fits inside the viewport,
/// ordered by Manhattan distance from the viewport centre to the widget's
/// centre (ties keep row-major scan order). The first candidate that neither
/// overlaps an existing placement nor straddles a boundary wins.
///
/// When nothing fits, the widget goes at column 0 below everything else,
/// extending the canvas.
pub fn find_optimal_position(
    size: GridSize,
    existing: &[Placement],
    viewport_cols: i32,
    viewport_rows: i32,
    boundaries: &[Boundary],
) -> GridPosition {
    let center_col = viewport_cols / 2;
    let center_row = viewport_rows / 2;
    let half_w = size.width_units / 2;
    let half_h = size.height_units / 2;

    let max_col = viewport_cols - size.width_units;
    let max_row = viewport_rows - size.height_units;

    let mut candidates: Vec<(i32, GridPosition)> = Vec::new();
    if max_col >= 0 && max_row >= 0 {
        candidates.reserve(candidate_count(max_col, max_row));
        for row in 0..=max_row {
            for col in 0..=max_col {
                let distance = (col + half_w - center_col).abs() + (row + half_h - center_row).abs();
                candidates.push((distance, GridPosition::new(col, row)));
            }
        }
    }
    // `sort_by_key` is stable, so equal distances stay row-major.
    candidates.sort_by_key(|(distance, _)| *distance);

    for (distance, position) in candidates {
        let rect = GridRect::from_placement(position, size);
        if overlaps_any(&rect, existing, None) {
            continue;
        }
        if straddles_any(&rect, boundaries) {
            continue;
        }
        log::trace!(
            "placement: {:?} at ({}, {}) distance {distance}",
            size,
            position.col,
            position.row
        );
        return position;
    }

    let row = existing
        .iter()
        .map(|p| p.rect().bottom)
        .max()
        .unwrap_or(0)
        .max(viewport_rows);
    log::trace!("placement: no free slot for {size:?}, extending canvas to row {row}");
    GridPosition::new(0, row)
}

/// Number of origins in `0..=max_col` × `0..=max_row`, without `i32` overflow.
fn candidate_count(max_col: i32, max_row: i32) -> usize {
    let cols = usize::try_from(max_col).map_or(0, |c| c + 1);
    let rows = usize::try_from(max_row).map_or(0, |r| r + 1);
    cols.saturating_mul(rows)
}

// ─── Snapping ────────────────────────────────────────────────────────────

/// Convert a pixel offset into a grid position aligned to `SNAP_UNIT`.
///
/// Each axis rounds to the nearest grid unit, then to an even unit with
/// odd values going up (`5 → 6`, `3 → 4`). A non-positive or non-finite
/// `grid_unit_px` yields the origin.
pub fn snap_to_grid(pixel_x: f32, pixel_y: f32, grid_unit_px: f32) -> GridPosition {
    if !(grid_unit_px.is_finite() && grid_unit_px > 0.0) {
        return GridPosition::ORIGIN;
    }
    GridPosition::new(
        snap_axis(pixel_x, grid_unit_px),
        snap_axis(pixel_y, grid_unit_px),
    )
}

fn snap_axis(pixel: f32, grid_unit_px: f32) -> i32 {
    // `as` saturates and maps NaN to 0; leave headroom for the `+ 1`.
    // Half units round toward +∞, so -2.5 becomes -2.
    let raw = ((pixel / grid_unit_px + 0.5).floor() as i32).clamp(i32::MIN + 1, i32::MAX - 1);
    ((raw + 1) / SNAP_UNIT) * SNAP_UNIT
}

/// Largest multiple of `SNAP_UNIT` that is `<= value`.
fn align_down(value: i32) -> i32 {
    value.div_euclid(SNAP_UNIT) * SNAP_UNIT
}

/// Keep a snapped position inside the viewport without breaking alignment.
/// A widget larger than the viewport is pinned to the origin on that axis.
pub fn clamp_to_viewport(
    position: GridPosition,
    size: GridSize,
    viewport_cols: i32,
    viewport_rows: i32,
) -> GridPosition {
    let max_col = align_down(viewport_cols - size.width_units).max(0);
    let max_row = align_down(viewport_rows - size.height_units).max(0);
    GridPosition::new(
        position.col.clamp(0, max_col),
        position.row.clamp(0, max_row),
    )
}

// ─── No-straddle enforcement ─────────────────────────────────────────────

/// Move a widget so it does not straddle any boundary edge.
///
/// Boundaries are corrected one after another in the order given; a later
/// correction may re-introduce a straddle against an earlier boundary.
/// Callers that need a guarantee re-check with `straddles_any`.
///
/// For each straddled edge there are two legal spots: snapped fully inside
/// the boundary or fully outside on the same side. The one closer to the
/// current position wins, ties going inside.
pub fn enforce_no_straddle(
    position: GridPosition,
    size: GridSize,
    boundaries: &[Boundary],
) -> GridPosition {
    let width = size.width_units;
    let height = size.height_units;
    let mut pos = position;

    for boundary in boundaries {
        let b = boundary.rect;
        let before = pos;

        // Left/right edges only matter when the rows overlap.
        let rect = GridRect::from_placement(pos, size);
        if rect.top < b.bottom && rect.bottom > b.top {
            if rect.left < b.right && rect.right > b.right {
                pos.col = closer(pos.col, b.right - width, b.right);
            }
            let rect = GridRect::from_placement(pos, size);
            if rect.left < b.left && rect.right > b.left {
                pos.col = closer(pos.col, b.left, b.left - width);
            }
        }

        // Top/bottom edges only matter when the columns overlap.
        let rect = GridRect::from_placement(pos, size);
        if rect.left < b.right && rect.right > b.left {
            if rect.top < b.bottom && rect.bottom > b.bottom {
                pos.row = closer(pos.row, b.bottom - height, b.bottom);
            }
            let rect = GridRect::from_placement(pos, size);
            if rect.top < b.top && rect.bottom > b.top {
                pos.row = closer(pos.row, b.top, b.top - height);
            }
        }

        if pos != before {
            log::trace!(
                "no-straddle: `{}` moved ({}, {}) -> ({}, {})",
                boundary.name,
                before.col,
                before.row,
                pos.col,
                pos.row
            );
        }
    }

    pos
}

/// Pick `inside` or `outside`, whichever is nearer `current`; ties go inside.
fn closer(current: i32, inside: i32, outside: i32) -> i32 {
    if (current - inside).abs() <= (current - outside).abs() {
        inside
    } else {
        outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridRect;
    use pretty_assertions::assert_eq;

    fn placement(name: &str, col: i32, row: i32, w: i32, h: i32) -> Placement {
        Placement {
            instance_id: WidgetId::intern(name),
            position: GridPosition::new(col, row),
            size: GridSize::new(w, h),
            z_index: 0,
        }
    }

    fn fold() -> Boundary {
        Boundary::new("fold", GridRect::new(0, 0, 10, 12))
    }

    #[test]
    fn empty_canvas_centres_widget() {
        let pos = find_optimal_position(GridSize::new(4, 2), &[], 20, 12, &[]);
        // widget centre (col + 2, row + 1) lands on (10, 6)
        assert_eq!(pos, GridPosition::new(8, 5));
    }

    #[test]
    fn search_skips_occupied_slots() {
        let existing = [placement("centre", 8, 5, 4, 2)];
        let pos = find_optimal_position(GridSize::new(4, 2), &existing, 20, 12, &[]);
        let rect = GridRect::from_placement(pos, GridSize::new(4, 2));
        assert!(!has_overlap(&rect, &existing[0].rect()));
        // every distance-1 slot still overlaps the centre widget
        let distance = (pos.col + 2 - 10).abs() + (pos.row + 1 - 6).abs();
        assert_eq!(distance, 2);
        assert_eq!(pos, GridPosition::new(8, 3));
    }

    #[test]
    fn search_avoids_straddling_boundaries() {
        let boundary = Boundary::new("fold", GridRect::new(0, 0, 10, 12));
        let pos = find_optimal_position(GridSize::new(4, 2), &[], 20, 12, &[boundary.clone()]);
        let rect = GridRect::from_placement(pos, GridSize::new(4, 2));
        assert!(!straddles_boundary(&rect, &boundary));
    }

    #[test]
    fn full_viewport_extends_canvas() {
        let existing = [placement("full", 0, 0, 4, 4)];
        let pos = find_optimal_position(GridSize::new(4, 4), &existing, 4, 4, &[]);
        assert_eq!(pos, GridPosition::new(0, 4));
    }

    #[test]
    fn fallback_goes_below_lowest_widget() {
        let existing = [placement("tall", 0, 0, 4, 9)];
        let pos = find_optimal_position(GridSize::new(6, 2), &existing, 4, 4, &[]);
        assert_eq!(pos, GridPosition::new(0, 9));
    }

    #[test]
    fn snap_rounds_odd_units_up() {
        assert_eq!(snap_to_grid(48.0, 48.0, 16.0), GridPosition::new(4, 4));
        assert_eq!(snap_to_grid(80.0, 80.0, 16.0), GridPosition::new(6, 6));
        assert_eq!(snap_to_grid(64.0, 0.0, 16.0), GridPosition::new(4, 0));
        // 7.4 units rounds to 7, then up to 8
        assert_eq!(snap_to_grid(118.0, 0.0, 16.0), GridPosition::new(8, 0));
        // -2.5 units rounds to -2, then up to 0
        assert_eq!(snap_to_grid(-40.0, 0.0, 16.0), GridPosition::new(0, 0));
        // -3.5 units rounds to -3, then up to -2
        assert_eq!(snap_to_grid(0.0, -56.0, 16.0), GridPosition::new(0, -2));
    }

    #[test]
    fn candidate_count_survives_huge_viewports() {
        assert_eq!(candidate_count(3, 1), 8);
        assert_eq!(candidate_count(-1, 5), 0);
        assert_eq!(candidate_count(60_000, 60_000), 60_001 * 60_001);
        assert_eq!(candidate_count(i32::MAX, i32::MAX), (1usize << 31).saturating_mul(1 << 31));
    }

    #[test]
    fn snap_with_degenerate_unit_is_origin() {
        assert_eq!(snap_to_grid(100.0, 100.0, 0.0), GridPosition::ORIGIN);
        assert_eq!(snap_to_grid(100.0, 100.0, -4.0), GridPosition::ORIGIN);
        assert_eq!(snap_to_grid(100.0, 100.0, f32::NAN), GridPosition::ORIGIN);
    }

    #[test]
    fn snap_survives_huge_offsets() {
        let pos = snap_to_grid(f32::MAX, f32::MIN, 1.0);
        assert_eq!(pos.col % SNAP_UNIT, 0);
        assert_eq!(pos.row % SNAP_UNIT, 0);
    }

    #[test]
    fn straddling_right_edge_tie_goes_inside() {
        let pos = enforce_no_straddle(GridPosition::new(8, 2), GridSize::new(4, 2), &[fold()]);
        assert_eq!(pos, GridPosition::new(6, 2));
    }

    #[test]
    fn straddling_right_edge_prefers_nearer_side() {
        // 9..13 crosses x=10: inside is 6 (delta 3), outside is 10 (delta 1)
        let pos = enforce_no_straddle(GridPosition::new(9, 0), GridSize::new(4, 2), &[fold()]);
        assert_eq!(pos, GridPosition::new(10, 0));
    }

    #[test]
    fn straddling_bottom_edge() {
        let boundary = Boundary::new("fold", GridRect::new(0, 0, 20, 6));
        let pos = enforce_no_straddle(GridPosition::new(2, 5), GridSize::new(4, 4), &[boundary]);
        // inside = 2 (delta 3), outside = 6 (delta 1)
        assert_eq!(pos, GridPosition::new(2, 6));
    }

    #[test]
    fn straddling_left_edge_from_outside() {
        let boundary = Boundary::new("alt-viewport", GridRect::new(6, 0, 20, 12));
        let pos = enforce_no_straddle(GridPosition::new(3, 0), GridSize::new(4, 2), &[boundary]);
        // inside = 6 (delta 3), outside = 2 (delta 1)
        assert_eq!(pos, GridPosition::new(2, 0));
    }

    #[test]
    fn non_straddling_positions_are_unchanged() {
        let inside = GridPosition::new(2, 2);
        let outside = GridPosition::new(12, 2);
        let size = GridSize::new(4, 4);
        assert_eq!(enforce_no_straddle(inside, size, &[fold()]), inside);
        assert_eq!(enforce_no_straddle(outside, size, &[fold()]), outside);
        assert_eq!(enforce_no_straddle(inside, size, &[]), inside);
    }

    #[test]
    fn boundaries_are_corrected_in_order() {
        // The second boundary's correction pushes the widget back across the
        // first boundary's edge; sequential correction leaves it there.
        let first = Boundary::new("a", GridRect::new(0, 0, 10, 12));
        let second = Boundary::new("b", GridRect::new(7, 0, 20, 12));
        let size = GridSize::new(4, 2);
        let pos = enforce_no_straddle(GridPosition::new(8, 0), size, &[first.clone(), second]);
        assert_eq!(pos, GridPosition::new(7, 0));
        assert!(straddles_boundary(&GridRect::from_placement(pos, size), &first));
    }

    #[test]
    fn overlap_ignores_self() {
        let placements = [placement("a", 0, 0, 4, 4), placement("b", 4, 0, 4, 4)];
        let rect = GridRect::new(0, 0, 4, 4);
        assert!(overlaps_any(&rect, &placements, None));
        assert!(!overlaps_any(&rect, &placements, Some(WidgetId::intern("a"))));
    }

    #[test]
    fn clamp_keeps_alignment() {
        let size = GridSize::new(5, 4);
        // 20 - 5 = 15 → aligned down to 14
        let pos = clamp_to_viewport(GridPosition::new(18, -2), size, 20, 12);
        assert_eq!(pos, GridPosition::new(14, 0));
        let huge = clamp_to_viewport(GridPosition::new(4, 4), GridSize::new(30, 30), 20, 12);
        assert_eq!(huge, GridPosition::ORIGIN);
    }
}
