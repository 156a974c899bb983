//! Input Module
//!
//! Platform-agnostic keyboard and mouse handling for the character controller.
//! This module is decoupled from any specific windowing system (like winit);
//! the host translates its events into [`InputEvent`] and pumps them through an
//! [`InputSource`].
//!
//! # Example
//!
//! ```rust,ignore
//! use avatar_rig_engine::input::{EventHub, InputEvent, KeyCode};
//!
//! let mut hub = EventHub::new();
//! // ... controller subscribes itself at construction ...
//! hub.dispatch(&InputEvent::KeyDown(KeyCode::W));
//! hub.dispatch(&InputEvent::MouseMove { dx: 4.0, dy: -1.0 });
//! ```

pub mod bindings;
pub mod keyboard;
pub mod mouse_deltas;
pub mod pointer_lock;
pub mod router;
pub mod source;

// Re-export commonly used types at module level
pub use bindings::{KeyBindings, MoveAction};
pub use keyboard::{InputState, InputStateTracker, KeyCode};
pub use mouse_deltas::{DEFAULT_QUEUE_CAPACITY, MouseDeltaQueue};
pub use pointer_lock::{
    ElementId, LockTransition, PointerCaptureManager, PointerHost, PointerLockState,
};
pub use router::InputRouter;
pub use source::{EventHub, InputEvent, InputListener, InputSource, SubscriptionId};
