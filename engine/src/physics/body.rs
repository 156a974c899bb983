//! Rigid body interface
//!
//! The character controller never integrates motion or resolves collisions.
//! It reads and writes bodies owned by an external physics world through these
//! traits, addressing them by [`BodyHandle`].

use glam::{Quat, Vec3};

/// The capabilities the controller needs from a rigid body.
///
/// `wake` asks the engine to wake a sleeping body so the new state takes
/// effect on the next step.
pub trait PhysicsBody {
    /// World-space position (meters)
    fn translation(&self) -> Vec3;

    fn rotation(&self) -> Quat;

    fn set_rotation(&mut self, rotation: Quat, wake: bool);

    /// Linear velocity (m/s)
    fn linear_velocity(&self) -> Vec3;

    fn set_linear_velocity(&mut self, velocity: Vec3, wake: bool);
}

/// Non-owning reference to a body inside a [`PhysicsWorld`].
///
/// The generation makes handles to removed bodies go stale instead of
/// aliasing whatever body reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// A set of bodies owned by the physics engine.
pub trait PhysicsWorld {
    /// `None` if the handle is stale or was never valid.
    fn body(&self, handle: BodyHandle) -> Option<&dyn PhysicsBody>;

    /// `None` if the handle is stale or was never valid.
    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut dyn PhysicsBody>;
}
