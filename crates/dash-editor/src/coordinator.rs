//! Edit coordinator: the authoritative owner of edit mode, focus, and the
//! single drag/resize slot.
//!
//! Gestures never mutate layout directly. They read one `EditSnapshot` when
//! they start and then call the coordinator's operations; the coordinator
//! snaps and validates through the placement engine before writing anything
//! back.
//!
//! `Dashboard` is the in-memory implementation used by hosts that do not
//! bring their own layout store.

use crate::gesture::GestureTarget;
use dash_core::config::CanvasConfig;
use dash_core::id::WidgetId;
use dash_core::model::*;
use dash_core::placement::{
    clamp_to_viewport, enforce_no_straddle, find_optimal_position, overlaps_any, snap_to_grid,
    straddles_any,
};
use dash_core::resize::resize_geometry;

/// Edit state as seen by a gesture at the moment it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditSnapshot {
    pub is_edit_mode: bool,
    pub focused_widget: Option<WidgetId>,
}

impl EditSnapshot {
    pub fn is_focused(&self, id: WidgetId) -> bool {
        self.focused_widget == Some(id)
    }
}

/// Why a drag or resize commit left the layout unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The result would overlap another committed widget.
    Overlap,
    /// The result would still straddle a boundary.
    Straddle,
    /// The result would leave the viewport.
    OutOfBounds,
    /// The widget was removed while it was being manipulated.
    UnknownWidget,
}

/// Result of ending a drag or resize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The placement was written back with its new geometry.
    Applied(Placement),
    /// The placement kept its previous geometry.
    Rejected {
        widget_id: WidgetId,
        reason: RejectReason,
    },
    /// There was no manipulation to commit.
    NothingActive,
}

/// Operations a gesture may invoke. Implementations own all shared state.
pub trait EditCoordinator {
    fn edit_snapshot(&self) -> EditSnapshot;

    fn enter_edit_mode(&mut self);

    fn exit_edit_mode(&mut self);

    fn focus_widget(&mut self, id: WidgetId);

    /// Open the drag slot for `widget_id`. Ignored while another drag or
    /// resize is active.
    #[allow(clippy::too_many_arguments)]
    fn start_drag(
        &mut self,
        widget_id: WidgetId,
        col: i32,
        row: i32,
        width_units: i32,
        height_units: i32,
        viewport_cols: i32,
        viewport_rows: i32,
    );

    /// Move the drag preview by a pixel delta.
    fn update_drag(&mut self, dx: f32, dy: f32, grid_unit_px: f32);

    /// Snap, validate and write back the dragged widget; clears the slot.
    fn end_drag(&mut self, grid_unit_px: f32) -> CommitOutcome;

    fn drag_state(&self) -> Option<DragUpdate>;

    /// Open the resize slot. Ignored while another drag or resize is active.
    #[allow(clippy::too_many_arguments)]
    fn start_resize(
        &mut self,
        widget_id: WidgetId,
        handle: ResizeHandle,
        position: GridPosition,
        size: GridSize,
        viewport_cols: i32,
        viewport_rows: i32,
    );

    /// Grow or shrink the resize preview by a pixel delta.
    fn update_resize(&mut self, dx: f32, dy: f32, grid_unit_px: f32);

    /// Validate and write back the resized widget; clears the slot.
    fn end_resize(&mut self, grid_unit_px: f32) -> CommitOutcome;

    fn resize_state(&self) -> Option<ResizeUpdate>;

    /// Drop any drag/resize preview without committing it.
    fn cancel_manipulation(&mut self);

    /// A short tap outside edit mode. Hosts that support taps override this.
    fn on_tap(&mut self, _target: &GestureTarget) {}

    /// A long press was confirmed on a focused widget.
    fn perform_long_press_haptic(&mut self) {}
}

// ─── Dashboard ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct DragSession {
    update: DragUpdate,
    origin: GridPosition,
    size: GridSize,
    viewport_cols: i32,
    viewport_rows: i32,
}

#[derive(Debug, Clone)]
struct ResizeSession {
    update: ResizeUpdate,
    origin: GridPosition,
    size: GridSize,
    total_dx: f32,
    total_dy: f32,
    viewport_cols: i32,
    viewport_rows: i32,
}

/// In-memory layout store and edit coordinator.
pub struct Dashboard {
    placements: Vec<Placement>,
    boundaries: BoundarySet,
    config: CanvasConfig,
    edit_mode: bool,
    focused: Option<WidgetId>,
    drag: Option<DragSession>,
    resize: Option<ResizeSession>,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Dashboard {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            placements: Vec::new(),
            boundaries: BoundarySet::new(),
            config,
            edit_mode: false,
            focused: None,
            drag: None,
            resize: None,
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn placement(&self, id: WidgetId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.instance_id == id)
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Replace the boundary snapshot (after a rotation or fold change).
    /// Existing placements are not revalidated.
    pub fn set_boundaries(&mut self, boundaries: impl IntoIterator<Item = Boundary>) {
        self.boundaries = boundaries.into_iter().collect();
        log::debug!("boundaries: {} active", self.boundaries.len());
    }

    pub fn set_viewport(&mut self, cols: i32, rows: i32) {
        self.config.viewport_cols = cols;
        self.config.viewport_rows = rows;
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn focused_widget(&self) -> Option<WidgetId> {
        self.focused
    }

    /// Place a new widget at the best free slot, on top of everything else.
    /// Re-adding an existing id replaces its placement.
    pub fn add_widget(&mut self, id: WidgetId, size: GridSize) -> Placement {
        self.placements.retain(|p| p.instance_id != id);
        let position = find_optimal_position(
            size,
            &self.placements,
            self.config.viewport_cols,
            self.config.viewport_rows,
            &self.boundaries,
        );
        let placement = Placement {
            instance_id: id,
            position,
            size,
            z_index: self.top_z() + 1,
        };
        log::debug!(
            "add {id:?}: {}x{} at ({}, {})",
            size.width_units,
            size.height_units,
            position.col,
            position.row
        );
        self.placements.push(placement.clone());
        placement
    }

    /// Add another instance of widget type `kind` under a fresh id.
    pub fn add_instance(&mut self, kind: &str, size: GridSize) -> Placement {
        self.add_widget(WidgetId::with_prefix(kind), size)
    }

    /// Remove a widget. Returns `false` if it did not exist.
    pub fn remove_widget(&mut self, id: WidgetId) -> bool {
        let before = self.placements.len();
        self.placements.retain(|p| p.instance_id != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        if self.drag.as_ref().is_some_and(|s| s.update.widget_id == id)
            || self.resize.as_ref().is_some_and(|s| s.update.widget_id == id)
        {
            self.cancel_manipulation();
        }
        self.placements.len() != before
    }

    fn top_z(&self) -> i32 {
        self.placements.iter().map(|p| p.z_index).max().unwrap_or(0)
    }

    /// Check a candidate placement for `id` against viewport, boundaries and
    /// every other widget.
    fn validate(
        &self,
        id: WidgetId,
        position: GridPosition,
        size: GridSize,
        viewport_cols: i32,
        viewport_rows: i32,
    ) -> Result<(), RejectReason> {
        let rect = GridRect::from_placement(position, size);
        if rect.left < 0 || rect.top < 0 || rect.right > viewport_cols || rect.bottom > viewport_rows
        {
            return Err(RejectReason::OutOfBounds);
        }
        if straddles_any(&rect, &self.boundaries) {
            return Err(RejectReason::Straddle);
        }
        if overlaps_any(&rect, &self.placements, Some(id)) {
            return Err(RejectReason::Overlap);
        }
        Ok(())
    }

    /// Write back validated geometry, or report why not.
    fn commit(
        &mut self,
        id: WidgetId,
        position: GridPosition,
        size: GridSize,
        viewport_cols: i32,
        viewport_rows: i32,
    ) -> CommitOutcome {
        if let Err(reason) = self.validate(id, position, size, viewport_cols, viewport_rows) {
            log::debug!("commit {id:?} rejected: {reason:?}");
            return CommitOutcome::Rejected {
                widget_id: id,
                reason,
            };
        }
        match self.placements.iter_mut().find(|p| p.instance_id == id) {
            Some(placement) => {
                placement.position = position;
                placement.size = size;
                log::debug!(
                    "commit {id:?}: {}x{} at ({}, {})",
                    size.width_units,
                    size.height_units,
                    position.col,
                    position.row
                );
                CommitOutcome::Applied(placement.clone())
            }
            None => CommitOutcome::Rejected {
                widget_id: id,
                reason: RejectReason::UnknownWidget,
            },
        }
    }

    fn is_manipulating(&self) -> bool {
        self.drag.is_some() || self.resize.is_some()
    }
}

impl EditCoordinator for Dashboard {
    fn edit_snapshot(&self) -> EditSnapshot {
        EditSnapshot {
            is_edit_mode: self.edit_mode,
            focused_widget: self.focused,
        }
    }

    fn enter_edit_mode(&mut self) {
        self.edit_mode = true;
    }

    fn exit_edit_mode(&mut self) {
        self.edit_mode = false;
        self.focused = None;
        self.cancel_manipulation();
    }

    /// Focus a widget and raise it above the others.
    fn focus_widget(&mut self, id: WidgetId) {
        let top = self.top_z();
        match self.placements.iter_mut().find(|p| p.instance_id == id) {
            Some(placement) => {
                if placement.z_index < top || self.focused != Some(id) {
                    placement.z_index = top + 1;
                }
                self.focused = Some(id);
            }
            None => log::debug!("focus {id:?}: no such widget"),
        }
    }

    fn start_drag(
        &mut self,
        widget_id: WidgetId,
        col: i32,
        row: i32,
        width_units: i32,
        height_units: i32,
        viewport_cols: i32,
        viewport_rows: i32,
    ) {
        if self.is_manipulating() {
            log::debug!("drag {widget_id:?} ignored: manipulation already active");
            return;
        }
        self.drag = Some(DragSession {
            update: DragUpdate {
                widget_id,
                current_offset_x: 0.0,
                current_offset_y: 0.0,
                is_dragging: true,
            },
            origin: GridPosition::new(col, row),
            size: GridSize::new(width_units, height_units),
            viewport_cols,
            viewport_rows,
        });
    }

    /// The preview may not leave the viewport.
    fn update_drag(&mut self, dx: f32, dy: f32, grid_unit_px: f32) {
        let Some(session) = self.drag.as_mut() else {
            return;
        };
        let unit = grid_unit_px.max(0.0);
        let min_x = -(session.origin.col as f32) * unit;
        let min_y = -(session.origin.row as f32) * unit;
        let max_x = ((session.viewport_cols - session.size.width_units - session.origin.col) as f32
            * unit)
            .max(min_x);
        let max_y = ((session.viewport_rows - session.size.height_units - session.origin.row)
            as f32
            * unit)
            .max(min_y);

        let update = &mut session.update;
        update.current_offset_x = (update.current_offset_x + dx).clamp(min_x, max_x);
        update.current_offset_y = (update.current_offset_y + dy).clamp(min_y, max_y);
    }

    fn end_drag(&mut self, grid_unit_px: f32) -> CommitOutcome {
        let Some(session) = self.drag.take() else {
            return CommitOutcome::NothingActive;
        };
        let id = session.update.widget_id;
        let pixel_x = session.origin.col as f32 * grid_unit_px + session.update.current_offset_x;
        let pixel_y = session.origin.row as f32 * grid_unit_px + session.update.current_offset_y;

        let snapped = snap_to_grid(pixel_x, pixel_y, grid_unit_px);
        let clamped = clamp_to_viewport(
            snapped,
            session.size,
            session.viewport_cols,
            session.viewport_rows,
        );
        let position = enforce_no_straddle(clamped, session.size, &self.boundaries);

        self.commit(
            id,
            position,
            session.size,
            session.viewport_cols,
            session.viewport_rows,
        )
    }

    fn drag_state(&self) -> Option<DragUpdate> {
        self.drag.as_ref().map(|s| s.update)
    }

    fn start_resize(
        &mut self,
        widget_id: WidgetId,
        handle: ResizeHandle,
        position: GridPosition,
        size: GridSize,
        viewport_cols: i32,
        viewport_rows: i32,
    ) {
        if self.is_manipulating() {
            log::debug!("resize {widget_id:?} ignored: manipulation already active");
            return;
        }
        let target_position = (handle != ResizeHandle::BottomRight).then_some(position);
        self.resize = Some(ResizeSession {
            update: ResizeUpdate {
                widget_id,
                handle,
                target_size: size,
                target_position,
                is_resizing: true,
            },
            origin: position,
            size,
            total_dx: 0.0,
            total_dy: 0.0,
            viewport_cols,
            viewport_rows,
        });
    }

    fn update_resize(&mut self, dx: f32, dy: f32, grid_unit_px: f32) {
        let min_size = self.config.min_widget_size;
        let Some(session) = self.resize.as_mut() else {
            return;
        };
        session.total_dx += dx;
        session.total_dy += dy;
        let (target_size, target_position) = resize_geometry(
            session.update.handle,
            session.origin,
            session.size,
            session.total_dx,
            session.total_dy,
            grid_unit_px,
            min_size,
        );
        session.update.target_size = target_size;
        session.update.target_position = target_position;
    }

    fn end_resize(&mut self, _grid_unit_px: f32) -> CommitOutcome {
        let Some(session) = self.resize.take() else {
            return CommitOutcome::NothingActive;
        };
        let update = session.update;
        let position = update.target_position.unwrap_or(session.origin);
        self.commit(
            update.widget_id,
            position,
            update.target_size,
            session.viewport_cols,
            session.viewport_rows,
        )
    }

    fn resize_state(&self) -> Option<ResizeUpdate> {
        self.resize.as_ref().map(|s| s.update)
    }

    fn cancel_manipulation(&mut self) {
        if self.drag.take().is_some() {
            log::debug!("drag cancelled");
        }
        if self.resize.take().is_some() {
            log::debug!("resize cancelled");
        }
    }
}
