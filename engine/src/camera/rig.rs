//! Camera Rig Module
//!
//! Places the camera relative to the character's resolved body transform.
//!
//! Two modes, fixed for the life of a rig:
//! - **ThirdPerson**: camera sits at `offset` rotated by the look yaw around the
//!   body, aimed at a point `look_lift` above the body origin.
//! - **HeadRelative**: camera sits at `head_offset` above the body origin and
//!   uses the smoothed look orientation directly.
//!
//! The rig is window-system agnostic; it only produces a [`CameraPose`] and a
//! GPU-ready [`CameraUniform`].

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use static_assertions::assert_eq_size;

use super::orientation::yaw_of;

/// Default third-person offset: above and behind the body.
pub const DEFAULT_THIRD_PERSON_OFFSET: Vec3 = Vec3::new(0.0, 5.0, 10.0);

/// Default height of the third-person aim point above the body origin.
pub const DEFAULT_LOOK_LIFT: f32 = 1.0;

/// Default eye height for head-relative mode.
pub const DEFAULT_HEAD_OFFSET: Vec3 = Vec3::new(0.0, 1.6, 0.0);

/// Camera placement rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CameraMode {
    /// Orbit behind the body: position = body + Ry(yaw) * offset
    ThirdPerson { offset: Vec3, look_lift: f32 },
    /// Eye at the body's head, looking along the smoothed orientation
    HeadRelative { head_offset: Vec3 },
}

impl Default for CameraMode {
    fn default() -> Self {
        CameraMode::ThirdPerson {
            offset: DEFAULT_THIRD_PERSON_OFFSET,
            look_lift: DEFAULT_LOOK_LIFT,
        }
    }
}

impl CameraMode {
    pub fn head_relative() -> Self {
        CameraMode::HeadRelative {
            head_offset: DEFAULT_HEAD_OFFSET,
        }
    }

    pub fn is_third_person(&self) -> bool {
        matches!(self, CameraMode::ThirdPerson { .. })
    }
}

/// Camera transform handed to the render layer once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Camera orientation; the camera looks along `orientation * -Z`
    pub orientation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            orientation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    /// Unit view direction.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// World-to-view matrix (right-handed, -Z forward).
    ///
    /// Built from the orientation so it stays valid when looking straight
    /// up or down.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            eye: self.position.to_array(),
            _pad0: 0.0,
            target: self.look_at.to_array(),
            _pad1: 0.0,
            orientation: self.orientation.to_array(),
            view: self.view_matrix().to_cols_array_2d(),
        }
    }
}

/// Camera data for shaders.
///
/// WGSL layout (112 bytes total):
///   offset  0: eye (vec3<f32>)           = 12 bytes
///   offset 12: _pad0 (f32)               = 4 bytes
///   offset 16: target (vec3<f32>)        = 12 bytes
///   offset 28: _pad1 (f32)               = 4 bytes
///   offset 32: orientation (vec4<f32>)   = 16 bytes (x, y, z, w)
///   offset 48: view (mat4x4<f32>)        = 64 bytes (column-major)
///   Total: 112 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub eye: [f32; 3],
    pub _pad0: f32,
    pub target: [f32; 3],
    pub _pad1: f32,
    pub orientation: [f32; 4],
    pub view: [[f32; 4]; 4],
}

assert_eq_size!(CameraUniform, [u8; 112]);

impl Default for CameraUniform {
    fn default() -> Self {
        CameraPose::default().to_uniform()
    }
}

/// Follows a body transform with a fixed [`CameraMode`].
#[derive(Debug, Clone)]
pub struct CameraRig {
    mode: CameraMode,
    pose: CameraPose,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(CameraMode::default())
    }
}

impl CameraRig {
    pub fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            pose: CameraPose::default(),
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Last pose produced by [`CameraRig::update`].
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Recompute the pose from the body's resolved translation and the look
    /// orientation for this tick.
    pub fn update(&mut self, body_translation: Vec3, orientation: Quat) -> CameraPose {
        self.pose = self.compute(body_translation, orientation);
        self.pose
    }

    /// Pose for the given inputs without storing it.
    pub fn compute(&self, body_translation: Vec3, orientation: Quat) -> CameraPose {
        match self.mode {
            CameraMode::ThirdPerson { offset, look_lift } => {
                let yaw = yaw_of(orientation);
                let position = body_translation + Quat::from_rotation_y(yaw) * offset;
                let look_at = body_translation + Vec3::new(0.0, look_lift, 0.0);
                CameraPose {
                    position,
                    look_at,
                    orientation: aim(look_at - position, yaw),
                }
            }
            CameraMode::HeadRelative { head_offset } => {
                let position = body_translation + head_offset;
                CameraPose {
                    position,
                    look_at: position + orientation * Vec3::NEG_Z,
                    orientation,
                }
            }
        }
    }
}

/// Orientation whose -Z axis points along `direction`.
///
/// Falls back to `fallback_yaw` when the direction has no horizontal part.
fn aim(direction: Vec3, fallback_yaw: f32) -> Quat {
    let dir = direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return Quat::from_rotation_y(fallback_yaw);
    }

    let horizontal = Vec3::new(dir.x, 0.0, dir.z);
    let heading = if horizontal.length_squared() > 1e-12 {
        (-dir.x).atan2(-dir.z)
    } else {
        fallback_yaw
    };
    let pitch = dir.y.clamp(-1.0, 1.0).asin();
    Quat::from_rotation_y(heading) * Quat::from_rotation_x(pitch)
}
