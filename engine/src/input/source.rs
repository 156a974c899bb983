//! Input Source Module
//!
//! Host input reaches listeners through an explicitly injected [`InputSource`]
//! instead of process-wide hooks. Listeners are held weakly, so a dropped
//! listener stops receiving events even if nobody unsubscribed it.

use std::cell::RefCell;
use std::rc::Weak;

use super::{ElementId, KeyCode};

/// One event delivered by the host environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Key pressed (auto-repeat presses arrive as repeated `KeyDown`)
    KeyDown(KeyCode),
    /// Key released
    KeyUp(KeyCode),
    /// Relative mouse motion in device units
    MouseMove { dx: f32, dy: f32 },
    /// Host reports the element that now owns pointer capture, if any
    PointerLockChange { element: Option<ElementId> },
    /// User gesture that may request capture
    Click,
}

/// Receives host input events.
pub trait InputListener {
    fn on_event(&mut self, event: &InputEvent);
}

/// Handle returned by [`InputSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscription capability handed to a controller at construction.
pub trait InputSource {
    fn subscribe(&mut self, listener: Weak<RefCell<dyn InputListener>>) -> SubscriptionId;

    /// Remove a subscription. Returns `false` if `id` was not subscribed.
    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

    /// Number of subscribed listeners that are still alive.
    fn listener_count(&self) -> usize;
}

/// In-process [`InputSource`] that the host pumps with [`EventHub::dispatch`].
#[derive(Default)]
pub struct EventHub {
    listeners: Vec<(SubscriptionId, Weak<RefCell<dyn InputListener>>)>,
    next_id: u64,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every live listener, in subscription order.
    ///
    /// Listeners whose owner has been dropped are pruned. A listener that is
    /// already borrowed (event dispatched from inside its own handler) is
    /// skipped. Returns the number of listeners that received the event.
    pub fn dispatch(&mut self, event: &InputEvent) -> usize {
        self.listeners
            .retain(|(_, listener)| listener.strong_count() > 0);

        let mut delivered = 0;
        for (id, listener) in &self.listeners {
            let Some(listener) = listener.upgrade() else {
                continue;
            };
            match listener.try_borrow_mut() {
                Ok(mut listener) => {
                    listener.on_event(event);
                    delivered += 1;
                }
                Err(_) => {
                    log::warn!(target: "input", "listener {id:?} busy, dropping {event:?}");
                }
            }
        }
        delivered
    }
}

impl InputSource for EventHub {
    fn subscribe(&mut self, listener: Weak<RefCell<dyn InputListener>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn listener_count(&self) -> usize {
        self.listeners
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }
}
