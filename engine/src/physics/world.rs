//! Reference physics world
//!
//! A minimal body store with gravity, explicit Euler integration and a flat
//! floor. It stands in for a full physics engine in the demo host and in tests.
//! There is no collision detection between bodies.
//!
//! # Example
//!
//! ```ignore
//! use avatar_rig_engine::physics::{KinematicBody, SimpleWorld};
//! use glam::Vec3;
//!
//! let mut world = SimpleWorld::default();
//! let handle = world.insert(KinematicBody::at(Vec3::new(0.0, 0.0, 0.0)));
//! world.step(1.0 / 60.0);
//! ```

use glam::{Quat, Vec3};

use super::body::{BodyHandle, PhysicsBody, PhysicsWorld};

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f32 = 9.81;

/// A body integrated by [`SimpleWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    /// Position in world space (meters)
    pub translation: Vec3,
    pub rotation: Quat,
    /// Velocity (meters/second)
    pub linear_velocity: Vec3,
    /// Sleeping bodies are skipped by [`SimpleWorld::step`]
    pub awake: bool,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            awake: true,
        }
    }
}

impl KinematicBody {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn sleep(&mut self) {
        self.awake = false;
    }
}

impl PhysicsBody for KinematicBody {
    fn translation(&self) -> Vec3 {
        self.translation
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat, wake: bool) {
        self.rotation = rotation;
        self.awake |= wake;
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn set_linear_velocity(&mut self, velocity: Vec3, wake: bool) {
        self.linear_velocity = velocity;
        self.awake |= wake;
    }
}

/// World tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    /// Acceleration applied to every awake body (m/s²)
    pub gravity: Vec3,
    /// Height of an infinite floor plane; `None` for free fall
    pub floor_height: Option<f32>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -STANDARD_GRAVITY, 0.0),
            floor_height: Some(0.0),
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<KinematicBody>,
}

/// Slot list of bodies addressed by generational handles.
#[derive(Debug, Clone, Default)]
pub struct SimpleWorld {
    config: WorldConfig,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SimpleWorld {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Add a body and return its handle.
    pub fn insert(&mut self, body: KinematicBody) -> BodyHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.body = Some(body);
            return BodyHandle::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            body: Some(body),
        });
        BodyHandle::new(index, 0)
    }

    /// Remove a body. Its handle (and every copy of it) goes stale.
    pub fn remove(&mut self, handle: BodyHandle) -> Option<KinematicBody> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        Some(body)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&KinematicBody> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.body.as_ref()
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut KinematicBody> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.body.as_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advance every awake body by `dt` seconds.
    ///
    /// Uses explicit Euler integration:
    /// - velocity += gravity * dt
    /// - position += velocity * dt
    ///
    /// Bodies below the floor are placed on it and lose downward velocity.
    pub fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let WorldConfig {
            gravity,
            floor_height,
        } = self.config;

        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            if !body.awake {
                continue;
            }

            body.linear_velocity += gravity * dt;
            body.translation += body.linear_velocity * dt;

            if let Some(floor) = floor_height {
                if body.translation.y < floor {
                    body.translation.y = floor;
                    body.linear_velocity.y = body.linear_velocity.y.max(0.0);
                }
            }
        }
    }
}

impl PhysicsWorld for SimpleWorld {
    fn body(&self, handle: BodyHandle) -> Option<&dyn PhysicsBody> {
        self.get(handle).map(|b| b as &dyn PhysicsBody)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut dyn PhysicsBody> {
        self.get_mut(handle).map(|b| b as &mut dyn PhysicsBody)
    }
}
