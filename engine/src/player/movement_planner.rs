//! Movement Planner
//!
//! Turns the directional flags into a world-space velocity command.
//!
//! # Model
//!
//! - Local forward is -Z, local right is +X
//! - Active flags are summed, the sum is normalized, then scaled by speed,
//!   so diagonal input is never faster than straight input
//! - The local direction is turned into world space by the yaw of the
//!   configured [`MovementFrame`]; pitch never tilts it
//! - The body's vertical velocity is passed through untouched; gravity and
//!   jumping belong to the physics engine
//!
//! # Usage
//!
//! ```rust,ignore
//! let planner = MovementPlanner::new(5.0, MovementFrame::LookYaw);
//! let command = planner.plan(input, &sources, body.linear_velocity());
//! body.set_linear_velocity(command.velocity, true);
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::yaw_of;
use crate::input::InputState;

/// Default movement speed in meters per second
pub const DEFAULT_MOVE_SPEED: f32 = 5.0;

/// Local forward direction (-Z)
pub const LOCAL_FORWARD: Vec3 = Vec3::NEG_Z;

/// Local right direction (+X)
pub const LOCAL_RIGHT: Vec3 = Vec3::X;

/// Which rotation a [`MovementFrame::BodyRotation`] frame reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationSample {
    /// The body's rotation before this tick writes a new one
    PreTick,
    /// The look orientation smoothed during this tick
    Smoothed,
}

/// The frame the local movement direction is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementFrame {
    /// Rotate by the raw (unsmoothed) look yaw
    #[default]
    LookYaw,
    /// Use world axes directly
    World,
    /// Rotate by the yaw of a body-related rotation
    BodyRotation(RotationSample),
}

/// Rotations a frame may read from, gathered once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSources {
    pub look_yaw: f32,
    /// Body rotation as read before this tick's write
    pub body_rotation: Quat,
    pub smoothed: Quat,
}

impl Default for HeadingSources {
    fn default() -> Self {
        Self {
            look_yaw: 0.0,
            body_rotation: Quat::IDENTITY,
            smoothed: Quat::IDENTITY,
        }
    }
}

impl MovementFrame {
    /// Yaw the local direction is rotated by.
    pub fn heading_yaw(&self, sources: &HeadingSources) -> f32 {
        match self {
            MovementFrame::LookYaw => sources.look_yaw,
            MovementFrame::World => 0.0,
            MovementFrame::BodyRotation(RotationSample::PreTick) => {
                yaw_of(sources.body_rotation)
            }
            MovementFrame::BodyRotation(RotationSample::Smoothed) => yaw_of(sources.smoothed),
        }
    }
}

/// Velocity to apply to the body this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityCommand {
    /// Full velocity: planned horizontal part plus preserved vertical part
    pub velocity: Vec3,
    /// Planned horizontal part only; length is 0 or the configured speed
    pub horizontal: Vec3,
}

impl VelocityCommand {
    pub fn is_moving(&self) -> bool {
        self.horizontal != Vec3::ZERO
    }
}

/// Maps input flags and heading to a velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementPlanner {
    /// Movement speed in meters per second
    speed: f32,
    frame: MovementFrame,
}

impl Default for MovementPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_SPEED, MovementFrame::default())
    }
}

impl MovementPlanner {
    pub fn new(speed: f32, frame: MovementFrame) -> Self {
        Self { speed, frame }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn frame(&self) -> MovementFrame {
        self.frame
    }

    /// Unnormalized sum of the active flags in local space.
    ///
    /// Opposite flags cancel: forward + backward contributes nothing.
    pub fn local_direction(input: &InputState) -> Vec3 {
        LOCAL_FORWARD * input.forward_axis() as f32 + LOCAL_RIGHT * input.right_axis() as f32
    }

    /// Plan this tick's velocity.
    ///
    /// `current_velocity` is the body's velocity before the write; only its
    /// vertical component is used.
    pub fn plan(
        &self,
        input: &InputState,
        sources: &HeadingSources,
        current_velocity: Vec3,
    ) -> VelocityCommand {
        let local = Self::local_direction(input).normalize_or_zero();

        let horizontal = if local == Vec3::ZERO {
            Vec3::ZERO
        } else {
            let yaw = self.frame.heading_yaw(sources);
            let world = Quat::from_rotation_y(yaw) * local;
            // Strip rounding noise so the vertical channel stays untouched
            Vec3::new(world.x, 0.0, world.z).normalize_or_zero() * self.speed
        };

        VelocityCommand {
            velocity: Vec3::new(horizontal.x, current_velocity.y, horizontal.z),
            horizontal,
        }
    }
}
