//! Avatar Rig Engine Library
//!
//! A physics-driven player character controller with mouse-look and a follow
//! camera. Keyboard and mouse input become rigid-body rotation and velocity
//! commands once per tick, and the camera is placed from the resulting body
//! transform. Collision and integration stay with the physics engine.
//!
//! # Modules
//!
//! - [`input`] - Platform-agnostic key flags, pointer capture, event routing
//! - [`camera`] - Look orientation and the camera rig
//! - [`player`] - Movement planning and the per-tick character controller
//! - [`physics`] - Body/world interface and a small reference world
//! - [`config`] - JSON-loadable controller configuration
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```ignore
//! use std::{cell::RefCell, rc::Rc};
//! use avatar_rig_engine::input::{EventHub, InputEvent, KeyCode};
//! use avatar_rig_engine::physics::{KinematicBody, SimpleWorld};
//! use avatar_rig_engine::{CharacterController, RigConfig};
//!
//! let hub = Rc::new(RefCell::new(EventHub::new()));
//! let mut world = SimpleWorld::default();
//! let body = world.insert(KinematicBody::default());
//!
//! let mut controller = CharacterController::new(RigConfig::default(), hub.clone(), host)?;
//! controller.attach_body(body);
//!
//! hub.borrow_mut().dispatch(&InputEvent::KeyDown(KeyCode::W));
//! let report = controller.tick(1.0 / 60.0, &mut world);
//! world.step(1.0 / 60.0);
//! ```

pub mod camera;
pub mod config;
pub mod error;
pub mod input;
pub mod physics;
pub mod player;

// Re-export commonly used types at crate level
pub use camera::{CameraMode, CameraPose, CameraRig, CameraUniform, OrientationController, Smoothing};
pub use config::RigConfig;
pub use error::{CaptureDenied, ConfigError, TickFault};
pub use input::{EventHub, InputEvent, InputSource, InputState, KeyCode, PointerHost};
pub use physics::{BodyHandle, PhysicsBody, PhysicsWorld};
pub use player::{
    CharacterController, FacingMode, Locomotion, MovementFrame, MovementPlanner, TickReport,
    TickStatus,
};
