//! Error Types
//!
//! Per-tick faults never escape the update loop; they are reported in the
//! tick report and logged. Configuration errors are ordinary `Result`s.

use std::fmt;

/// A fault that made the controller skip part of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFault {
    /// No physics body is attached, or the attached handle no longer
    /// resolves to a body in the world.
    MissingBody,
}

impl fmt::Display for TickFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickFault::MissingBody => write!(f, "no physics body attached"),
        }
    }
}

impl std::error::Error for TickFault {}

/// The host refused (or could not honour) a pointer-lock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDenied {
    pub reason: String,
}

impl CaptureDenied {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for CaptureDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pointer capture denied: {}", self.reason)
    }
}

impl std::error::Error for CaptureDenied {}

/// Errors from loading or validating a [`crate::config::RigConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A value parsed but is outside its allowed range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
