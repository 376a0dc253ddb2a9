pub mod coordinator;
pub mod driver;
pub mod gesture;
pub mod input;

pub use coordinator::{CommitOutcome, Dashboard, EditCoordinator, EditSnapshot, RejectReason};
pub use driver::track_gesture;
pub use gesture::{
    GestureConfig, GestureContext, GestureMachine, GestureMode, GestureState, GestureTarget,
    GestureTier,
};
pub use input::{PointerChange, PointerFrame, PointerId, PointerPhase};
