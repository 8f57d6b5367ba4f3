//! Fogbound - orbital launch arcade core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (influence field, fog of war, drag launching)
//! - `frame`: Per-frame data handed to the fog compositor and overlay renderer
//! - `persistence`: Save/load of explored fog state
//! - `settings`: Data-driven tuning and quality presets

pub mod error;
pub mod frame;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, PersistError};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Window dimensions; the world is six windows wide and tall
    pub const WINDOW_WIDTH: f32 = 1280.0;
    pub const WINDOW_HEIGHT: f32 = 720.0;
    pub const WORLD_SCALE: f32 = 6.0;
    pub const WORLD_WIDTH: f32 = WINDOW_WIDTH * WORLD_SCALE;
    pub const WORLD_HEIGHT: f32 = WINDOW_HEIGHT * WORLD_SCALE;

    /// Home planet (launch target) diameter
    pub const EARTH_SIZE: f32 = 96.0;
    /// Reveal radius around the home planet at session start
    pub const HOME_REVEAL_RADIUS: f32 = 300.0;

    /// Drag launcher defaults
    pub const MAX_PULL: f32 = 100.0;
    pub const MAX_LAUNCH_SPEED: f32 = 320.0;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 6.0;
    pub const SHIP_REVEAL_RADIUS: f32 = 120.0;
    /// Ship lifetime in seconds before it drifts out of contact
    pub const SHIP_LIFETIME: f32 = 45.0;
    /// Hard cap on ship speed (influence can't fling it faster)
    pub const SHIP_MAX_SPEED: f32 = 900.0;

    /// Fog mask defaults
    pub const FOG_CELL_SIZE: f32 = 16.0;
    pub const FOG_EDGE_SOFTNESS: f32 = 24.0;

    /// Test repulser defaults
    pub const REPULSER_STRENGTH: f32 = -300.0;
    pub const REPULSER_RANGE: f32 = 100.0;

    /// Fastest accepted rotation (hazard orbits, asteroid spin), radians/s
    pub const MAX_ANGULAR_SPEED: f32 = 8.0 * std::f32::consts::PI;
}

/// Normalized angle to [-π, π). Non-finite input yields NaN.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Direction of a vector in degrees, counter-clockwise from +x, in [0, 360)
#[inline]
pub fn angle_deg(v: Vec2) -> f32 {
    let deg = v.y.atan2(v.x).to_degrees();
    if deg < 0.0 { deg + 360.0 } else { deg }
}

/// Unit vector for an angle measured in degrees where 0 points "up" (+y)
#[inline]
pub fn up_rotated(angle_deg: f32) -> Vec2 {
    let rad = angle_deg.to_radians();
    Vec2::new(-rad.sin(), rad.cos())
}

/// Hermite smoothstep between two edges
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
