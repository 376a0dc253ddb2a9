//! Input abstraction layer.
//!
//! Platform touch/mouse callbacks are normalized into `PointerFrame`s: the
//! list of pointer changes delivered together in one dispatch. A gesture
//! tracks the single pointer that went down first and ignores the rest.

use smallvec::SmallVec;

/// Platform pointer id, stable for the lifetime of one contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u64);

/// What happened to a pointer in this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Contact started (touch start, mouse button down).
    Down,
    /// Contact moved.
    Move,
    /// Contact lifted normally.
    Up,
    /// The platform took the pointer away (gesture stolen by a parent,
    /// window lost focus).
    Cancel,
}

/// One pointer's state within a frame, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerChange {
    pub id: PointerId,
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
}

/// All pointer changes dispatched together.
///
/// An empty frame means the platform lost track of every pointer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerFrame {
    pub changes: SmallVec<[PointerChange; 2]>,
}

impl PointerFrame {
    fn single(x: f32, y: f32, phase: PointerPhase) -> Self {
        let mut changes = SmallVec::new();
        changes.push(PointerChange {
            id: PointerId::default(),
            x,
            y,
            phase,
        });
        Self { changes }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::single(x, y, PointerPhase::Down)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::single(x, y, PointerPhase::Move)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::single(x, y, PointerPhase::Up)
    }

    pub fn cancel(x: f32, y: f32) -> Self {
        Self::single(x, y, PointerPhase::Cancel)
    }

    /// A frame with no changes at all (lost finger).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add another pointer's change to this frame.
    pub fn with(mut self, change: PointerChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes belonging to `id`, in dispatch order.
    pub fn changes_for(&self, id: PointerId) -> impl Iterator<Item = &PointerChange> {
        self.changes.iter().filter(move |c| c.id == id)
    }

    /// The first pointer going down in this frame, if any.
    pub fn first_down(&self) -> Option<&PointerChange> {
        self.changes
            .iter()
            .find(|c| c.phase == PointerPhase::Down)
    }
}
