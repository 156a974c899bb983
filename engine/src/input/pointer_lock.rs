//! Pointer Lock Module
//!
//! Mirrors the host's exclusive pointer-capture state for mouse-look.
//!
//! The host is the source of truth: it may grant a request later, deny it, or
//! revoke capture at any time (Escape, focus loss). The manager only changes to
//! `Locked` when a host change notification names the element it asked for.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut capture = PointerCaptureManager::new(host, ElementId(0));
//!
//! // Click: ask the host for capture (asynchronous)
//! capture.request()?;
//!
//! // Later, host reports the new owner
//! capture.on_host_change(Some(ElementId(0)));
//! assert!(capture.is_locked());
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::CaptureDenied;

/// Identifies the host element that owns (or should own) pointer capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Host environment hooks for exclusive pointer capture.
///
/// Both calls are fire-and-forget: the outcome is reported back later as an
/// `InputEvent::PointerLockChange`. Implementations must not dispatch that
/// notification re-entrantly from inside these calls.
pub trait PointerHost {
    /// Ask the host to route relative mouse motion to `target`.
    fn request_pointer_lock(&self, target: ElementId) -> Result<(), CaptureDenied>;

    /// Give capture back to the host.
    fn exit_pointer_lock(&self);
}

/// Pointer capture state. There are no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerLockState {
    #[default]
    Unlocked,
    Locked,
}

/// Result of feeding a request, release, or notification to the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    /// State did not change
    None,
    /// Unlocked -> Locked
    Acquired,
    /// Locked -> Unlocked
    Lost,
}

/// Unlocked <-> Locked state machine for mouse capture.
pub struct PointerCaptureManager {
    state: PointerLockState,
    /// Element this manager asks the host to lock
    target: ElementId,
    /// Last element the host reported as owning capture
    host_element: Option<ElementId>,
    /// A request was accepted by the host but not yet confirmed
    pending: bool,
    host: Rc<dyn PointerHost>,
}

impl std::fmt::Debug for PointerCaptureManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerCaptureManager")
            .field("state", &self.state)
            .field("target", &self.target)
            .field("host_element", &self.host_element)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl PointerCaptureManager {
    /// Create a manager in the `Unlocked` state.
    pub fn new(host: Rc<dyn PointerHost>, target: ElementId) -> Self {
        Self {
            state: PointerLockState::Unlocked,
            target,
            host_element: None,
            pending: false,
            host,
        }
    }

    pub fn state(&self) -> PointerLockState {
        self.state
    }

    pub fn is_locked(&self) -> bool {
        self.state == PointerLockState::Locked
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    /// Last capture owner reported by the host.
    pub fn host_element(&self) -> Option<ElementId> {
        self.host_element
    }

    /// Ask the host for capture.
    ///
    /// No-op while already `Locked`. A successful call only marks the request
    /// as pending; the state flips when the host notification arrives.
    pub fn request(&mut self) -> Result<(), CaptureDenied> {
        if self.is_locked() {
            return Ok(());
        }

        match self.host.request_pointer_lock(self.target) {
            Ok(()) => {
                self.pending = true;
                log::debug!(target: "pointer_lock", "capture requested for {:?}", self.target);
                Ok(())
            }
            Err(denied) => {
                self.pending = false;
                log::warn!(target: "pointer_lock", "{denied}");
                Err(denied)
            }
        }
    }

    /// Give capture back to the host.
    ///
    /// Transitions to `Unlocked` immediately. While `Unlocked` this only
    /// withdraws a pending request, if any.
    pub fn release(&mut self) -> LockTransition {
        match self.state {
            PointerLockState::Locked => {
                self.host.exit_pointer_lock();
                self.state = PointerLockState::Unlocked;
                self.host_element = None;
                self.pending = false;
                log::debug!(target: "pointer_lock", "Locked -> Unlocked (released)");
                LockTransition::Lost
            }
            PointerLockState::Unlocked => {
                if self.pending {
                    self.host.exit_pointer_lock();
                    self.pending = false;
                    log::debug!(target: "pointer_lock", "pending request withdrawn");
                }
                LockTransition::None
            }
        }
    }

    /// Reconcile with the host's view of who owns capture.
    pub fn on_host_change(&mut self, element: Option<ElementId>) -> LockTransition {
        self.host_element = element;
        self.pending = false;

        let next = if element == Some(self.target) {
            PointerLockState::Locked
        } else {
            PointerLockState::Unlocked
        };

        if next == self.state {
            return LockTransition::None;
        }

        self.state = next;
        match next {
            PointerLockState::Locked => {
                log::debug!(target: "pointer_lock", "Unlocked -> Locked ({:?})", self.target);
                LockTransition::Acquired
            }
            PointerLockState::Unlocked => {
                log::debug!(target: "pointer_lock", "Locked -> Unlocked (host owner {element:?})");
                LockTransition::Lost
            }
        }
    }
}
