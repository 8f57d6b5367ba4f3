//! Error types
//!
//! Setup problems surface as `ConfigError` before the first tick; nothing
//! inside a tick returns an error.

use std::fmt;

/// Invalid configuration supplied at construction time
#[derive(Debug)]
pub enum ConfigError {
    /// World width/height must be finite and positive
    InvalidWorldSize { width: f32, height: f32 },
    /// Fog cell size must be finite and positive
    InvalidCellSize(f32),
    /// Fog grid would be too large to allocate
    GridTooLarge { cols: usize, rows: usize },
    /// Edge softness must be finite and non-negative
    InvalidEdgeSoftness(f32),
    /// Maximum pull distance must be finite and positive
    InvalidMaxPull(f32),
    /// Launch speed must be finite and positive
    InvalidLaunchSpeed(f32),
    /// Influencer range must be finite and non-negative
    InvalidRange(f32),
    /// Influencer strength must be finite
    InvalidStrength(f32),
    /// Falloff parameters out of range
    InvalidFalloff(String),
    /// Pulse amplitude must lie in 0..=1
    InvalidAmplitude(f32),
    /// Pulse frequency must be finite and non-negative
    InvalidFrequency(f32),
    /// Angular speed must be finite and within `MAX_ANGULAR_SPEED`
    InvalidAngularSpeed(f32),
    /// Settings file could not be read
    Io(std::io::Error),
    /// Settings file is not valid JSON for `Settings`
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidWorldSize { width, height } => {
                write!(f, "invalid world size {width}x{height}")
            }
            ConfigError::InvalidCellSize(v) => write!(f, "invalid fog cell size: {v}"),
            ConfigError::GridTooLarge { cols, rows } => {
                write!(f, "fog grid too large: {cols}x{rows} cells")
            }
            ConfigError::InvalidEdgeSoftness(v) => write!(f, "invalid fog edge softness: {v}"),
            ConfigError::InvalidMaxPull(v) => write!(f, "invalid max pull: {v}"),
            ConfigError::InvalidLaunchSpeed(v) => write!(f, "invalid launch speed: {v}"),
            ConfigError::InvalidRange(v) => write!(f, "invalid influencer range: {v}"),
            ConfigError::InvalidStrength(v) => write!(f, "invalid influencer strength: {v}"),
            ConfigError::InvalidFalloff(msg) => write!(f, "invalid falloff: {msg}"),
            ConfigError::InvalidAmplitude(v) => write!(f, "invalid pulse amplitude: {v}"),
            ConfigError::InvalidFrequency(v) => write!(f, "invalid pulse frequency: {v}"),
            ConfigError::InvalidAngularSpeed(v) => write!(f, "invalid angular speed: {v}"),
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

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

/// Errors while saving or restoring fog state
#[derive(Debug)]
pub enum PersistError {
    /// Envelope version is not supported
    UnsupportedVersion(u32),
    /// Stored grid does not match the session's grid
    GridMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
    /// Stored world dimensions do not match the session's world
    WorldMismatch {
        expected: (f32, f32),
        found: (f32, f32),
    },
    /// Mask array length disagrees with its grid dimensions
    MaskLength { expected: usize, found: usize },
    /// A mask value is outside [0, 1] or not finite
    MaskValue { index: usize, value: f32 },
    /// Standard I/O error
    Io(std::io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::UnsupportedVersion(v) => write!(f, "unsupported save version: {v}"),
            PersistError::GridMismatch { expected, found } => write!(
                f,
                "fog grid mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            PersistError::WorldMismatch { expected, found } => write!(
                f,
                "world size mismatch: expected {}x{}, found {}x{}",
                expected.0, expected.1, found.0, found.1
            ),
            PersistError::MaskLength { expected, found } => {
                write!(f, "mask length {found}, expected {expected}")
            }
            PersistError::MaskValue { index, value } => {
                write!(f, "mask value {value} at index {index} out of range")
            }
            PersistError::Io(e) => write!(f, "IO error: {e}"),
            PersistError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for PersistError {}

impl From<std::io::Error> for PersistError {
    fn from(e: std::io::Error) -> Self {
        PersistError::Io(e)
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Json(e)
    }
}
