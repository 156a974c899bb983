//! Camera Module
//!
//! Mouse-look orientation and the follow camera rig.
//! This module is window-system agnostic - it only deals with camera state and math.

pub mod orientation;
pub mod rig;

pub use orientation::{
    DEFAULT_SENSITIVITY, DEFAULT_SMOOTHING_FACTOR, LookSettings, OrientationController,
    Smoothing, yaw_of,
};
pub use rig::{
    CameraMode, CameraPose, CameraRig, CameraUniform, DEFAULT_HEAD_OFFSET, DEFAULT_LOOK_LIFT,
    DEFAULT_THIRD_PERSON_OFFSET,
};
