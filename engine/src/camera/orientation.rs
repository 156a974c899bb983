//! Orientation Controller Module
//!
//! Accumulates yaw and pitch from captured mouse motion and eases a smoothed
//! orientation toward the raw target each tick.
//!
//! Key features:
//! - Mouse right turns right: `yaw -= dx * sensitivity`
//! - Mouse down looks down: `pitch -= dy * sensitivity`, clamped
//! - Pitch is optional; third-person rigs usually only model yaw
//! - Smoothing is either a fixed per-tick factor or scaled by elapsed time
//!
//! # Coordinate System
//! - +X = right
//! - +Y = up
//! - -Z = forward
//!
//! With yaw=0 and pitch=0 the view looks toward -Z.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Default look sensitivity in radians per device unit.
pub const DEFAULT_SENSITIVITY: f32 = 0.002;

/// Default per-tick smoothing factor.
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.1;

/// Heading of a rotation about +Y, ignoring pitch and roll.
///
/// Read from the rotated +X axis, which pitch never moves, so it stays
/// well defined when looking straight up or down.
pub fn yaw_of(rotation: Quat) -> f32 {
    let right = rotation * Vec3::X;
    (-right.z).atan2(right.x)
}

/// How the smoothed orientation chases its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Smoothing {
    /// Slerp by the same factor every tick, whatever the tick length.
    /// Turning speed therefore depends on the tick rate.
    Fixed { factor: f32 },
    /// Slerp by `1 - exp(-rate * dt)`; converges at the same speed at any
    /// tick rate.
    TimeScaled { rate: f32 },
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::Fixed {
            factor: DEFAULT_SMOOTHING_FACTOR,
        }
    }
}

impl Smoothing {
    /// Interpolation factor for a tick of length `dt` seconds, in `[0, 1]`.
    pub fn factor(&self, dt: f32) -> f32 {
        let raw = match *self {
            Smoothing::Fixed { factor } => factor,
            Smoothing::TimeScaled { rate } => 1.0 - (-rate * dt.max(0.0)).exp(),
        };
        if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 }
    }
}

/// Mouse-look tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookSettings {
    /// Radians per device unit of mouse motion
    pub sensitivity: f32,
    /// `(min, max)` pitch in radians; `None` means pitch is not modeled
    pub pitch_limits: Option<(f32, f32)>,
    /// Flip vertical mouse motion
    pub invert_y: bool,
    pub smoothing: Smoothing,
}

impl Default for LookSettings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            pitch_limits: Some((-FRAC_PI_2, FRAC_PI_2)),
            invert_y: false,
            smoothing: Smoothing::default(),
        }
    }
}

/// Yaw/pitch accumulator with a smoothed quaternion output.
#[derive(Clone, Debug)]
pub struct OrientationController {
    /// Rotation about +Y in radians; unbounded
    yaw: f32,
    /// Rotation about the lateral axis in radians; always within limits
    pitch: f32,
    /// Sanitised pitch range, `None` when pitch is not modeled
    pitch_range: Option<(f32, f32)>,
    smoothed: Quat,
    settings: LookSettings,
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(LookSettings::default())
    }
}

impl OrientationController {
    pub fn new(settings: LookSettings) -> Self {
        Self::with_yaw_pitch(settings, 0.0, 0.0)
    }

    /// Start facing `yaw`/`pitch`, with the smoothed orientation already there.
    pub fn with_yaw_pitch(settings: LookSettings, yaw: f32, pitch: f32) -> Self {
        let pitch_range = settings.pitch_limits.map(|(a, b)| {
            let lo = a.min(b).clamp(-FRAC_PI_2, FRAC_PI_2);
            let hi = a.max(b).clamp(-FRAC_PI_2, FRAC_PI_2);
            (lo, hi)
        });

        let mut controller = Self {
            yaw: 0.0,
            pitch: 0.0,
            pitch_range,
            smoothed: Quat::IDENTITY,
            settings,
        };
        controller.set_yaw(yaw);
        controller.set_pitch(pitch);
        controller.snap();
        controller
    }

    /// Apply one relative mouse delta. Non-finite deltas are ignored.
    pub fn on_mouse_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }

        self.yaw -= dx * self.settings.sensitivity;

        if let Some((lo, hi)) = self.pitch_range {
            let dy = if self.settings.invert_y { -dy } else { dy };
            self.pitch = (self.pitch - dy * self.settings.sensitivity).clamp(lo, hi);
        }
    }

    /// Raw orientation built from the current yaw and pitch.
    pub fn target(&self) -> Quat {
        match self.pitch_range {
            Some(_) => Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch),
            None => Quat::from_rotation_y(self.yaw),
        }
    }

    /// Ease the smoothed orientation toward the target and return it.
    pub fn tick(&mut self, dt: f32) -> Quat {
        let t = self.settings.smoothing.factor(dt);
        self.smoothed = self.smoothed.slerp(self.target(), t).normalize();
        self.smoothed
    }

    /// Jump the smoothed orientation straight to the target.
    pub fn snap(&mut self) {
        self.smoothed = self.target();
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    #[inline]
    pub fn smoothed(&self) -> Quat {
        self.smoothed
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        if yaw.is_finite() {
            self.yaw = yaw;
        }
    }

    /// Set pitch directly, clamped to the limits. No-op when pitch is not modeled.
    pub fn set_pitch(&mut self, pitch: f32) {
        if let Some((lo, hi)) = self.pitch_range {
            if pitch.is_finite() {
                self.pitch = pitch.clamp(lo, hi);
            }
        }
    }

    pub fn pitch_limits(&self) -> Option<(f32, f32)> {
        self.pitch_range
    }

    pub fn settings(&self) -> &LookSettings {
        &self.settings
    }
}
