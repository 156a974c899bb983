//! Physics boundary for the character controller
//!
//! The controller does not simulate physics. It talks to bodies owned by an
//! external engine through [`PhysicsBody`] and [`PhysicsWorld`].
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//!
//! # Submodules
//!
//! - [`body`] - Body and world traits, generational body handles
//! - [`world`] - Small reference world used by the demo host and tests

pub mod body;
pub mod world;

pub use body::{BodyHandle, PhysicsBody, PhysicsWorld};
pub use world::{KinematicBody, STANDARD_GRAVITY, SimpleWorld, WorldConfig};
