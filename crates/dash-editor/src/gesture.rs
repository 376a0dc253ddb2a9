//! Pointer gesture state machine.
//!
//! One `GestureMachine` runs per pointer-down sequence against a single
//! target and turns pointer frames plus one long-press deadline into
//! coordinator calls.
//!
//! The edit state is captured once when the sequence starts and decides
//! which row of the table below applies for the whole sequence, even if the
//! coordinator changes underneath (entering edit mode on long press must not
//! turn the same finger into a drag).
//!
//! | Context | Short tap | Moves past slop first | Long press | Then move | Then up |
//! |---------|-----------|-----------------------|------------|-----------|---------|
//! | Not editing | `on_tap` | cancel | enter edit (+ focus widget) | nothing | release |
//! | Editing, widget focused | exit edit | cancel | haptic, arm drag | drag | commit, or exit edit if never moved |
//! | Editing, widget unfocused | focus | ignored | n/a | n/a | n/a |
//! | Editing, blank canvas | exit edit | cancel | n/a | n/a | n/a |
//! | Resize handle | release | confirms resize | n/a | resize | commit |
//!
//! Timing is owned by the caller: `long_press_deadline` says how long after
//! the down event `on_long_press` is due, and `driver::track_gesture` races
//! that against the next frame.

use crate::coordinator::{EditCoordinator, EditSnapshot};
use crate::input::{PointerFrame, PointerId, PointerPhase};
use dash_core::config::CanvasConfig;
use dash_core::id::WidgetId;
use dash_core::model::{GridPosition, GridSize, ResizeHandle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─── Config ───────────────────────────────────────────────────────────────

/// Timing and movement thresholds for classifying a pointer sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Hold time before a press becomes a long press. Default: **400 ms**.
    pub long_press_timeout_ms: u64,

    /// Movement on either axis, from the down point, that cancels a pending
    /// tap or long press. Default: **8 px**.
    pub touch_slop_px: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_timeout_ms: 400,
            touch_slop_px: 8.0,
        }
    }
}

impl GestureConfig {
    pub fn long_press_timeout(&self) -> Duration {
        Duration::from_millis(self.long_press_timeout_ms)
    }

    /// Parse a JSON config object; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns a message if the JSON is malformed or the slop is negative.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("invalid gesture config: {e}"))?;
        if !(config.touch_slop_px.is_finite() && config.touch_slop_px >= 0.0) {
            return Err(format!(
                "touch_slop_px must be non-negative, got {}",
                config.touch_slop_px
            ));
        }
        Ok(config)
    }
}

// ─── Targets & Context ───────────────────────────────────────────────────

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureTarget {
    /// Empty canvas.
    Canvas,
    /// The body of a widget.
    Widget {
        id: WidgetId,
        position: GridPosition,
        size: GridSize,
    },
    /// A corner handle of a widget (only shown on the focused widget in
    /// edit mode).
    ResizeHandle {
        id: WidgetId,
        handle: ResizeHandle,
        position: GridPosition,
        size: GridSize,
    },
}

impl GestureTarget {
    pub fn widget_id(&self) -> Option<WidgetId> {
        match self {
            Self::Canvas => None,
            Self::Widget { id, .. } | Self::ResizeHandle { id, .. } => Some(*id),
        }
    }
}

/// Everything a gesture reads from the outside world, captured at down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureContext {
    pub snapshot: EditSnapshot,
    pub viewport_cols: i32,
    pub viewport_rows: i32,
    pub grid_unit_px: f32,
}

impl GestureContext {
    /// Read the coordinator's edit state once.
    pub fn capture<C: EditCoordinator + ?Sized>(coordinator: &C, canvas: &CanvasConfig) -> Self {
        Self {
            snapshot: coordinator.edit_snapshot(),
            viewport_cols: canvas.viewport_cols,
            viewport_rows: canvas.viewport_rows,
            grid_unit_px: canvas.grid_unit_px,
        }
    }
}

/// Row of the transition table, chosen once per sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureTier {
    /// Not in edit mode: tap, or long press into edit mode.
    Browse,
    /// Edit mode, pointer on empty canvas.
    EditCanvas,
    /// Edit mode, pointer on the focused widget.
    EditFocused,
    /// Edit mode, pointer on some other widget.
    EditUnfocused,
    /// Edit mode, pointer on the focused widget's resize handle.
    Resize,
}

impl GestureTier {
    fn classify(target: &GestureTarget, snapshot: &EditSnapshot) -> Self {
        if !snapshot.is_edit_mode {
            return Self::Browse;
        }
        match target {
            GestureTarget::Canvas => Self::EditCanvas,
            GestureTarget::ResizeHandle { id, .. } if snapshot.is_focused(*id) => Self::Resize,
            GestureTarget::Widget { id, .. } | GestureTarget::ResizeHandle { id, .. } => {
                if snapshot.is_focused(*id) {
                    Self::EditFocused
                } else {
                    Self::EditUnfocused
                }
            }
        }
    }

    fn has_long_press(self) -> bool {
        matches!(self, Self::Browse | Self::EditFocused)
    }
}

// ─── States ──────────────────────────────────────────────────────────────

/// What a confirmed sequence does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    /// Long press on blank canvas entered edit mode.
    EnterEdit,
    /// Long press on a widget entered edit mode and focused it.
    EnterEditAndFocus(WidgetId),
    /// Long press on the focused widget armed a drag.
    StartDrag,
    /// Press on a resize handle armed a resize.
    StartResize(ResizeHandle),
}

impl GestureMode {
    fn manipulates(self) -> bool {
        matches!(self, Self::StartDrag | Self::StartResize(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// Down seen; waiting for up, slop, or the long-press deadline.
    /// `movement` is the displacement from the down point in pixels.
    AwaitingClassification { movement: (f32, f32) },
    /// Long press (or handle press) confirmed; no manipulation yet.
    LongPressConfirmed(GestureMode),
    /// A drag or resize is live; `offset` is the pixel offset applied so far.
    Dragging { offset: (f32, f32) },
    /// Ended by a normal up.
    Released,
    /// Ended without effect.
    Cancelled,
    /// Ended by committing a drag or resize.
    Committed,
}

impl GestureState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Released | Self::Cancelled | Self::Committed)
    }
}

// ─── Machine ─────────────────────────────────────────────────────────────

pub struct GestureMachine {
    target: GestureTarget,
    tier: GestureTier,
    context: GestureContext,
    config: GestureConfig,
    pointer: PointerId,
    origin: (f32, f32),
    last: (f32, f32),
    mode: Option<GestureMode>,
    state: GestureState,
    /// Set once this sequence opened a drag/resize slot on the coordinator.
    manipulating: bool,
}

impl GestureMachine {
    /// Start a sequence from the first pointer going down in `frame`.
    /// Returns `None` if the frame has no down change.
    pub fn begin(
        frame: &PointerFrame,
        target: GestureTarget,
        context: GestureContext,
        config: GestureConfig,
    ) -> Option<Self> {
        let down = frame.first_down()?;
        let tier = GestureTier::classify(&target, &context.snapshot);

        let mode = match (tier, target) {
            (GestureTier::Resize, GestureTarget::ResizeHandle { handle, .. }) => {
                Some(GestureMode::StartResize(handle))
            }
            _ => None,
        };
        log::debug!("gesture: down on {target:?} as {tier:?}");

        Some(Self {
            target,
            tier,
            context,
            config,
            pointer: down.id,
            origin: (down.x, down.y),
            last: (down.x, down.y),
            mode,
            state: GestureState::AwaitingClassification {
                movement: (0.0, 0.0),
            },
            manipulating: false,
        })
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn tier(&self) -> GestureTier {
        self.tier
    }

    pub fn target(&self) -> &GestureTarget {
        &self.target
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// Time after the down event at which `on_long_press` is due, while the
    /// sequence is still unclassified. `None` means nothing is pending.
    pub fn long_press_deadline(&self) -> Option<Duration> {
        match self.state {
            GestureState::AwaitingClassification { .. } if self.tier.has_long_press() => {
                Some(self.config.long_press_timeout())
            }
            _ => None,
        }
    }

    /// Feed one pointer frame.
    pub fn on_frame<C: EditCoordinator + ?Sized>(
        &mut self,
        frame: &PointerFrame,
        coordinator: &mut C,
    ) -> GestureState {
        if self.is_finished() {
            return self.state;
        }
        if frame.is_empty() {
            return self.cancel(coordinator, "pointer lost");
        }

        let mut moved_to = None;
        let mut up_at = None;
        let mut cancelled = false;
        for change in frame.changes_for(self.pointer) {
            match change.phase {
                PointerPhase::Down | PointerPhase::Move => moved_to = Some((change.x, change.y)),
                PointerPhase::Up => up_at = Some((change.x, change.y)),
                PointerPhase::Cancel => cancelled = true,
            }
        }

        if cancelled {
            return self.cancel(coordinator, "pointer cancelled");
        }
        if let Some(position) = moved_to {
            self.on_move(position, coordinator);
        }
        if let Some(position) = up_at
            && !self.is_finished()
        {
            if position != self.last {
                self.on_move(position, coordinator);
            }
            if !self.is_finished() {
                self.on_up(coordinator);
            }
        }
        self.state
    }

    /// The input stream ended without an up.
    pub fn on_stream_closed<C: EditCoordinator + ?Sized>(&mut self, coordinator: &mut C) -> GestureState {
        if self.is_finished() {
            return self.state;
        }
        self.cancel(coordinator, "input closed")
    }

    /// The long-press deadline elapsed with the pointer still down.
    pub fn on_long_press<C: EditCoordinator + ?Sized>(&mut self, coordinator: &mut C) -> GestureState {
        if self.long_press_deadline().is_none() {
            return self.state;
        }
        let mode = match (self.tier, self.target) {
            (GestureTier::Browse, GestureTarget::Canvas) => {
                coordinator.enter_edit_mode();
                GestureMode::EnterEdit
            }
            (GestureTier::Browse, _) => {
                coordinator.enter_edit_mode();
                match self.target.widget_id() {
                    Some(id) => {
                        coordinator.focus_widget(id);
                        GestureMode::EnterEditAndFocus(id)
                    }
                    None => GestureMode::EnterEdit,
                }
            }
            _ => {
                coordinator.perform_long_press_haptic();
                GestureMode::StartDrag
            }
        };
        log::debug!("gesture: long press confirmed as {mode:?}");
        self.mode = Some(mode);
        self.state = GestureState::LongPressConfirmed(mode);
        self.state
    }

    fn on_move<C: EditCoordinator + ?Sized>(&mut self, position: (f32, f32), coordinator: &mut C) {
        let delta = (position.0 - self.last.0, position.1 - self.last.1);
        self.last = position;

        // A handle needs no long press: the first move confirms it.
        if self.tier == GestureTier::Resize
            && let GestureState::AwaitingClassification { .. } = self.state
            && let Some(mode) = self.mode
        {
            self.state = GestureState::LongPressConfirmed(mode);
        }

        match self.state {
            GestureState::AwaitingClassification { .. } => {
                let movement = (position.0 - self.origin.0, position.1 - self.origin.1);
                let slop = self.config.touch_slop_px;
                // Unfocused widgets in edit mode focus on any up, however far
                // the finger travelled.
                if self.tier != GestureTier::EditUnfocused
                    && (movement.0.abs() > slop || movement.1.abs() > slop)
                {
                    log::debug!("gesture: slop exceeded by {movement:?}, cancelling");
                    self.state = GestureState::Cancelled;
                } else {
                    self.state = GestureState::AwaitingClassification { movement };
                }
            }
            GestureState::LongPressConfirmed(mode) => {
                if mode.manipulates() && delta != (0.0, 0.0) {
                    self.start_manipulation(mode, coordinator);
                    self.apply_delta(mode, delta, (0.0, 0.0), coordinator);
                }
            }
            GestureState::Dragging { offset } => {
                if let Some(mode) = self.mode
                    && delta != (0.0, 0.0)
                {
                    self.apply_delta(mode, delta, offset, coordinator);
                }
            }
            GestureState::Released | GestureState::Cancelled | GestureState::Committed => {}
        }
    }

    fn start_manipulation<C: EditCoordinator + ?Sized>(&mut self, mode: GestureMode, coordinator: &mut C) {
        let ctx = self.context;
        match (mode, self.target) {
            (GestureMode::StartDrag, GestureTarget::Widget { id, position, size })
            | (GestureMode::StartDrag, GestureTarget::ResizeHandle { id, position, size, .. }) => {
                coordinator.start_drag(
                    id,
                    position.col,
                    position.row,
                    size.width_units,
                    size.height_units,
                    ctx.viewport_cols,
                    ctx.viewport_rows,
                );
            }
            (
                GestureMode::StartResize(handle),
                GestureTarget::ResizeHandle { id, position, size, .. },
            ) => {
                coordinator.start_resize(
                    id,
                    handle,
                    position,
                    size,
                    ctx.viewport_cols,
                    ctx.viewport_rows,
                );
            }
            _ => return,
        }
        // The coordinator ignores the start while another slot is open.
        let owner = match mode {
            GestureMode::StartResize(_) => coordinator.resize_state().map(|r| r.widget_id),
            _ => coordinator.drag_state().map(|d| d.widget_id),
        };
        if owner.is_none() || owner != self.target.widget_id() {
            log::debug!("gesture: {mode:?} refused, slot held by {owner:?}");
            return;
        }
        self.manipulating = true;
        log::debug!("gesture: {mode:?} started");
    }

    fn apply_delta<C: EditCoordinator + ?Sized>(
        &mut self,
        mode: GestureMode,
        delta: (f32, f32),
        offset: (f32, f32),
        coordinator: &mut C,
    ) {
        if !self.manipulating {
            return;
        }
        let unit = self.context.grid_unit_px;
        match mode {
            GestureMode::StartDrag => coordinator.update_drag(delta.0, delta.1, unit),
            GestureMode::StartResize(_) => coordinator.update_resize(delta.0, delta.1, unit),
            GestureMode::EnterEdit | GestureMode::EnterEditAndFocus(_) => return,
        }
        self.state = GestureState::Dragging {
            offset: (offset.0 + delta.0, offset.1 + delta.1),
        };
    }

    fn on_up<C: EditCoordinator + ?Sized>(&mut self, coordinator: &mut C) {
        let unit = self.context.grid_unit_px;

        if self.tier == GestureTier::EditUnfocused {
            if let Some(id) = self.target.widget_id() {
                coordinator.focus_widget(id);
            }
            self.finish(GestureState::Released);
            return;
        }

        match self.state {
            GestureState::AwaitingClassification { .. } => {
                match self.tier {
                    GestureTier::Browse => coordinator.on_tap(&self.target),
                    GestureTier::EditCanvas | GestureTier::EditFocused => {
                        coordinator.exit_edit_mode()
                    }
                    GestureTier::EditUnfocused | GestureTier::Resize => {}
                }
                self.finish(GestureState::Released);
            }
            GestureState::LongPressConfirmed(_) | GestureState::Dragging { .. } => {
                match self.mode {
                    Some(GestureMode::StartDrag) => {
                        if self.manipulating {
                            let outcome = coordinator.end_drag(unit);
                            log::debug!("gesture: drag ended with {outcome:?}");
                            self.finish(GestureState::Committed);
                        } else {
                            coordinator.exit_edit_mode();
                            self.finish(GestureState::Released);
                        }
                    }
                    Some(GestureMode::StartResize(_)) if self.manipulating => {
                        let outcome = coordinator.end_resize(unit);
                        log::debug!("gesture: resize ended with {outcome:?}");
                        self.finish(GestureState::Committed);
                    }
                    _ => self.finish(GestureState::Released),
                }
            }
            GestureState::Released | GestureState::Cancelled | GestureState::Committed => {}
        }
    }

    fn cancel<C: EditCoordinator + ?Sized>(&mut self, coordinator: &mut C, why: &str) -> GestureState {
        if self.manipulating {
            coordinator.cancel_manipulation();
        }
        log::debug!("gesture: cancelled ({why})");
        self.finish(GestureState::Cancelled);
        self.state
    }

    fn finish(&mut self, state: GestureState) {
        self.manipulating = false;
        self.state = state;
    }
}
