//! Simulation error types
//!
//! Nothing fails mid-tick. Every error here is raised while building a
//! [`Simulation`](crate::sim::Simulation) or a substance from its parameters.

use std::fmt;

/// Errors raised when configuration or spawn parameters are invalid
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// `max_size` must be finite, positive and strictly greater than `min_size`
    InvalidSizeRange { min: f32, max: f32 },
    /// A split must produce at least one piece
    InvalidPieceBudget,
    /// Speeds must be finite with `0 < min_speed <= max_speed`
    InvalidSpeedRange { min: f32, max: f32 },
    /// Surface extents must be finite and positive
    InvalidSurface { width: f32, height: f32 },
    /// Tick length must be finite and positive
    InvalidTickDuration,
    /// Delays and durations must be finite and non-negative
    InvalidDuration { name: &'static str, value: f32 },
    /// Config text could not be parsed
    ConfigParse(String),
    /// Config file could not be read
    ConfigIo(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidSizeRange { min, max } => write!(
                f,
                "invalid size range: max_size ({}) must be greater than min_size ({}) and both positive",
                max, min
            ),
            SimError::InvalidPieceBudget => write!(f, "piece_budget must be greater than 0"),
            SimError::InvalidSpeedRange { min, max } => write!(
                f,
                "invalid speed range [{}, {}]: need 0 < min_speed <= max_speed",
                min, max
            ),
            SimError::InvalidSurface { width, height } => write!(
                f,
                "surface extent {}x{} must be positive and finite",
                width, height
            ),
            SimError::InvalidTickDuration => write!(f, "tick_ms must be positive and finite"),
            SimError::InvalidDuration { name, value } => {
                write!(f, "'{}' = {} must be finite and non-negative", name, value)
            }
            SimError::ConfigParse(msg) => write!(f, "failed to parse config: {}", msg),
            SimError::ConfigIo(msg) => write!(f, "failed to read config: {}", msg),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::ConfigParse(err.to_string())
    }
}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;
