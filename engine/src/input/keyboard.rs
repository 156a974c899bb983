//! Keyboard Input Module
//!
//! Contains directional flag tracking for movement keys.
//! Decoupled from winit to use generic key codes.

use serde::{Deserialize, Serialize};

use super::bindings::{KeyBindings, MoveAction};

/// Generic key codes, independent of windowing system.
///
/// These map to physical key positions but are not tied to `winit::keyboard::KeyCode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyCode {
    // Letter keys
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Arrow keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Number keys
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Control keys
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    Escape,
    Enter,
    Tab,

    /// Catch-all for keys the host could not name
    Unknown,
}

/// The four directional flags read once per tick.
///
/// Flags are independent; pressing forward and backward together is legal
/// and cancels out in the movement planner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// Create a state with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward/backward direction (-1, 0, or 1).
    pub fn forward_axis(&self) -> i32 {
        (self.forward as i32) - (self.backward as i32)
    }

    /// Left/right direction (-1, 0, or 1).
    pub fn right_axis(&self) -> i32 {
        (self.right as i32) - (self.left as i32)
    }

    pub fn get(&self, action: MoveAction) -> bool {
        match action {
            MoveAction::Forward => self.forward,
            MoveAction::Backward => self.backward,
            MoveAction::Left => self.left,
            MoveAction::Right => self.right,
        }
    }

    pub fn set(&mut self, action: MoveAction, value: bool) {
        match action {
            MoveAction::Forward => self.forward = value,
            MoveAction::Backward => self.backward = value,
            MoveAction::Left => self.left = value,
            MoveAction::Right => self.right = value,
        }
    }
}

/// Maps key events onto persistent directional flags.
///
/// Last event wins per flag: releasing *any* key bound to a flag clears it,
/// even while another key bound to the same flag is still held. Holding W and
/// ArrowUp and releasing ArrowUp stops forward movement.
#[derive(Debug, Clone, Default)]
pub struct InputStateTracker {
    state: InputState,
    bindings: KeyBindings,
}

impl InputStateTracker {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            state: InputState::default(),
            bindings,
        }
    }

    /// Handle a key press. Auto-repeat presses are harmless.
    ///
    /// Returns `false` (and changes nothing) for keys with no binding.
    pub fn on_key_down(&mut self, key: KeyCode) -> bool {
        self.handle_key(key, true)
    }

    /// Handle a key release.
    ///
    /// Returns `false` (and changes nothing) for keys with no binding.
    pub fn on_key_up(&mut self, key: KeyCode) -> bool {
        self.handle_key(key, false)
    }

    /// Update flag state for a press or release.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        match self.bindings.action_for(key) {
            Some(action) => {
                self.state.set(action, pressed);
                true
            }
            None => {
                log::trace!(target: "input", "ignoring unbound key {key:?}");
                false
            }
        }
    }

    /// Copy of the current flags.
    pub fn snapshot(&self) -> InputState {
        self.state
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Release every flag (e.g. on focus loss).
    pub fn reset(&mut self) {
        self.state = InputState::default();
    }
}
