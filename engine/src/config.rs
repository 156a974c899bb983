//! Controller Configuration
//!
//! Every tunable of the character controller, overridable at construction.
//! Loaded from JSON; missing fields fall back to the defaults below.
//!
//! ```json
//! {
//!   "movement_speed": 6.5,
//!   "smoothing": { "kind": "time_scaled", "rate": 12.0 },
//!   "camera": { "mode": "head_relative", "head_offset": [0.0, 1.7, 0.0] }
//! }
//! ```

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::{CameraMode, DEFAULT_SENSITIVITY, LookSettings, Smoothing};
use crate::error::ConfigError;
use crate::input::{DEFAULT_QUEUE_CAPACITY, ElementId, KeyBindings};
use crate::player::{DEFAULT_MOVE_SPEED, FacingMode, MovementFrame};

/// Slack allowed on the ±π/2 pitch bound for values that went through text.
const PITCH_BOUND_SLACK: f32 = 1e-6;

// ============================================================================
// TYPES
// ============================================================================

/// Tuning for one character controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RigConfig {
    /// Horizontal speed in meters per second (e.g., 5.0).
    pub movement_speed: f32,
    /// Radians of look rotation per device unit of mouse motion (e.g., 0.002).
    pub mouse_sensitivity: f32,
    /// Flip vertical mouse motion.
    pub invert_y: bool,
    /// `[min, max]` pitch in radians; `null` disables pitch.
    pub pitch_limits: Option<[f32; 2]>,
    /// How the look orientation eases toward its target.
    pub smoothing: Smoothing,
    /// Camera placement rule.
    pub camera: CameraMode,
    /// Frame the movement keys are interpreted in.
    pub movement_frame: MovementFrame,
    /// What the body rotation follows.
    pub facing: FacingMode,
    /// Host element that pointer capture is requested for.
    pub capture_target: ElementId,
    /// Mouse deltas buffered per tick before coalescing.
    pub delta_queue_capacity: usize,
    /// Movement key bindings.
    pub bindings: KeyBindings,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            movement_speed: DEFAULT_MOVE_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            invert_y: false,
            pitch_limits: Some([-FRAC_PI_2, FRAC_PI_2]),
            smoothing: Smoothing::default(),
            camera: CameraMode::default(),
            movement_frame: MovementFrame::default(),
            facing: FacingMode::default(),
            capture_target: ElementId::default(),
            delta_queue_capacity: DEFAULT_QUEUE_CAPACITY,
            bindings: KeyBindings::default(),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl RigConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RigConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(target: "controller", "loaded rig config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.movement_speed.is_finite() || self.movement_speed < 0.0 {
            return Err(invalid(format!(
                "movement_speed must be finite and non-negative, got {}",
                self.movement_speed
            )));
        }

        if !self.mouse_sensitivity.is_finite() || self.mouse_sensitivity < 0.0 {
            return Err(invalid(format!(
                "mouse_sensitivity must be finite and non-negative, got {}",
                self.mouse_sensitivity
            )));
        }

        if let Some([min, max]) = self.pitch_limits {
            let bound = FRAC_PI_2 + PITCH_BOUND_SLACK;
            if !(min.is_finite() && max.is_finite()) || min < -bound || max > bound || min > max {
                return Err(invalid(format!(
                    "pitch_limits must satisfy -pi/2 <= min <= max <= pi/2, got [{min}, {max}]"
                )));
            }
        }

        match self.smoothing {
            Smoothing::Fixed { factor } => {
                if !factor.is_finite() || !(0.0..=1.0).contains(&factor) {
                    return Err(invalid(format!(
                        "smoothing factor must be within [0, 1], got {factor}"
                    )));
                }
            }
            Smoothing::TimeScaled { rate } => {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(invalid(format!(
                        "smoothing rate must be finite and non-negative, got {rate}"
                    )));
                }
            }
        }

        match self.camera {
            CameraMode::ThirdPerson { offset, look_lift } => {
                if !offset.is_finite() || !look_lift.is_finite() {
                    return Err(invalid("third-person camera offset must be finite"));
                }
            }
            CameraMode::HeadRelative { head_offset } => {
                if !head_offset.is_finite() {
                    return Err(invalid("head offset must be finite"));
                }
            }
        }

        if self.delta_queue_capacity == 0 {
            return Err(invalid("delta_queue_capacity must be at least 1"));
        }

        if self.bindings.is_empty() {
            log::warn!(target: "controller", "no movement keys bound");
        }

        Ok(())
    }

    /// Mouse-look settings derived from this config.
    pub fn look_settings(&self) -> LookSettings {
        LookSettings {
            sensitivity: self.mouse_sensitivity,
            pitch_limits: self.pitch_limits.map(|[min, max]| (min, max)),
            invert_y: self.invert_y,
            smoothing: self.smoothing,
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}
