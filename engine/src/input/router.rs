//! Input Router
//!
//! The controller's [`InputListener`]. Event handlers only mutate flags, the
//! capture state, and the delta queue; all real work waits for the next tick.

use std::rc::Rc;

use super::{
    ElementId, InputEvent, InputListener, InputState, InputStateTracker, KeyBindings,
    MouseDeltaQueue, PointerCaptureManager, PointerHost, PointerLockState,
};

/// Routes host events to the key tracker, capture manager and delta queue.
#[derive(Debug)]
pub struct InputRouter {
    keys: InputStateTracker,
    capture: PointerCaptureManager,
    deltas: MouseDeltaQueue,
}

impl InputRouter {
    pub fn new(
        bindings: KeyBindings,
        host: Rc<dyn PointerHost>,
        capture_target: ElementId,
        queue_capacity: usize,
    ) -> Self {
        Self {
            keys: InputStateTracker::new(bindings),
            capture: PointerCaptureManager::new(host, capture_target),
            deltas: MouseDeltaQueue::with_capacity(queue_capacity),
        }
    }

    pub fn snapshot(&self) -> InputState {
        self.keys.snapshot()
    }

    pub fn lock_state(&self) -> PointerLockState {
        self.capture.state()
    }

    pub fn capture(&self) -> &PointerCaptureManager {
        &self.capture
    }

    pub fn keys(&self) -> &InputStateTracker {
        &self.keys
    }

    pub fn deltas_mut(&mut self) -> &mut MouseDeltaQueue {
        &mut self.deltas
    }

    pub fn pending_deltas(&self) -> usize {
        self.deltas.len()
    }

    /// Release capture if held. Motion queued while locked is kept for the
    /// next tick.
    pub fn release_capture(&mut self) {
        self.capture.release();
    }

    /// Clear every movement flag. Key-ups sent while the host is unfocused
    /// never arrive.
    pub fn reset_keys(&mut self) {
        self.keys.reset();
    }
}

impl InputListener for InputRouter {
    fn on_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::KeyDown(key) => {
                self.keys.on_key_down(key);
            }
            InputEvent::KeyUp(key) => {
                self.keys.on_key_up(key);
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.capture.is_locked() {
                    self.deltas.push(dx, dy);
                }
            }
            InputEvent::PointerLockChange { element } => {
                self.capture.on_host_change(element);
            }
            InputEvent::Click => match self.capture.request() {
                Ok(()) => {}
                // Logged by the capture manager; mouse-look stays inactive
                Err(_) => {}
            },
        }
    }
}
