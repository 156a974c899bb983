//! Player Module
//!
//! Provides player character movement and control systems.
//!
//! # Components
//!
//! - [`MovementPlanner`] - Directional flags to world-space velocity
//!   - Diagonal input normalized before scaling by speed
//!   - Vertical velocity always left to the physics engine
//! - [`CharacterController`] - Fixed-order per-tick update driving a physics
//!   body and the camera rig
//! - [`MovementFrame`] - Which rotation the movement keys are relative to
//! - [`FacingMode`] - What the body's rotation follows

pub mod controller;
pub mod movement_planner;

pub use controller::{CharacterController, FacingMode, Locomotion, TickReport, TickStatus};
pub use movement_planner::{
    DEFAULT_MOVE_SPEED, HeadingSources, LOCAL_FORWARD, LOCAL_RIGHT, MovementFrame,
    MovementPlanner, RotationSample, VelocityCommand,
};
