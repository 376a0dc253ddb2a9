//! Async gesture driver.
//!
//! Feeds a `GestureMachine` from a channel of pointer frames and fires its
//! long-press deadline. Whichever completes first wins: a frame that arrives
//! before the deadline is processed and the deadline is re-evaluated, and a
//! deadline that elapses first confirms the long press.

use crate::coordinator::EditCoordinator;
use crate::gesture::{GestureMachine, GestureState};
use crate::input::PointerFrame;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

/// Run one gesture to completion. The down event is taken to have happened
/// when this is called.
///
/// A closed channel counts as a lost pointer and cancels the gesture.
pub async fn track_gesture<C: EditCoordinator + ?Sized>(
    mut machine: GestureMachine,
    frames: &mut mpsc::Receiver<PointerFrame>,
    coordinator: &mut C,
) -> GestureState {
    let started = Instant::now();

    while !machine.is_finished() {
        let Some(timeout) = machine.long_press_deadline() else {
            match frames.recv().await {
                Some(frame) => machine.on_frame(&frame, coordinator),
                None => machine.on_stream_closed(coordinator),
            };
            continue;
        };

        let deadline = started + timeout;
        if Instant::now() >= deadline {
            machine.on_long_press(coordinator);
            continue;
        }
        tokio::select! {
            biased;
            frame = frames.recv() => match frame {
                Some(frame) => machine.on_frame(&frame, coordinator),
                None => machine.on_stream_closed(coordinator),
            },
            () = sleep_until(deadline) => {
                log::trace!("long press deadline reached after {:?}", started.elapsed());
                machine.on_long_press(coordinator)
            }
        };
    }

    machine.state()
}
