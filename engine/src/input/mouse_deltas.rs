//! Mouse Delta Queue
//!
//! Buffers raw relative mouse motion between ticks. Unlike a running sum, each
//! delta is kept separately so the orientation clamp sees the same sequence it
//! would have seen had the deltas been applied on arrival.

use glam::Vec2;

/// Default number of deltas buffered per tick before coalescing.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Fixed-capacity FIFO of mouse deltas.
///
/// Storage is allocated once. When full, further deltas are summed into the
/// last entry instead of growing the buffer.
#[derive(Debug, Clone)]
pub struct MouseDeltaQueue {
    deltas: Vec<Vec2>,
    capacity: usize,
}

impl Default for MouseDeltaQueue {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }
}

impl MouseDeltaQueue {
    /// Create a queue holding at most `capacity` separate deltas (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            deltas: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Queue one delta in device units.
    #[inline]
    pub fn push(&mut self, dx: f32, dy: f32) {
        let delta = Vec2::new(dx, dy);
        if !delta.is_finite() {
            log::trace!(target: "input", "dropping non-finite mouse delta");
            return;
        }

        if self.deltas.len() < self.capacity {
            self.deltas.push(delta);
        } else if let Some(last) = self.deltas.last_mut() {
            *last += delta;
        }
    }

    /// Remove and yield every queued delta in arrival order.
    ///
    /// The buffer keeps its allocation.
    #[inline]
    pub fn drain(&mut self) -> std::vec::Drain<'_, Vec2> {
        self.deltas.drain(..)
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
