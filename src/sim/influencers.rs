//! Concrete influencer variants
//!
//! A flat set: static gravity wells (planets), test repulsers, pulsing wells
//! and hazards that orbit an anchor point.

use glam::Vec2;

use super::influence::{
    BodyKind, Collidable, InfluenceGizmo, InfluenceProfile, Influencer, gizmo_colors,
    validate_angular_speed, validate_source,
};
use crate::consts::{REPULSER_RANGE, REPULSER_STRENGTH};
use crate::error::ConfigError;

/// Static attractor anchored on a planet
#[derive(Debug, Clone)]
pub struct GravityWell {
    pub pos: Vec2,
    pub strength: f32,
    pub range: f32,
    pub profile: InfluenceProfile,
}

impl GravityWell {
    pub fn new(pos: Vec2, strength: f32, range: f32) -> Result<Self, ConfigError> {
        validate_source(strength, range)?;
        Ok(Self {
            pos,
            strength: strength.abs(),
            range,
            profile: InfluenceProfile::default(),
        })
    }

    pub fn with_profile(mut self, profile: InfluenceProfile) -> Result<Self, ConfigError> {
        profile.validate()?;
        self.profile = profile;
        Ok(self)
    }
}

impl Influencer for GravityWell {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn strength(&self) -> f32 {
        self.strength
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn profile(&self) -> InfluenceProfile {
        self.profile
    }
}

/// Fixed repulser used for testing launch trajectories
#[derive(Debug, Clone)]
pub struct Repulser {
    pub pos: Vec2,
    strength: f32,
    pub range: f32,
    pub profile: InfluenceProfile,
}

impl Repulser {
    /// `magnitude` is stored negated; a repulser never attracts
    pub fn new(pos: Vec2, magnitude: f32, range: f32) -> Result<Self, ConfigError> {
        validate_source(magnitude, range)?;
        Ok(Self {
            pos,
            strength: -magnitude.abs(),
            range,
            profile: InfluenceProfile::default(),
        })
    }

    /// Debug repulser with the stock strength and range
    pub fn test(pos: Vec2) -> Self {
        Self {
            pos,
            strength: REPULSER_STRENGTH,
            range: REPULSER_RANGE,
            profile: InfluenceProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: InfluenceProfile) -> Result<Self, ConfigError> {
        profile.validate()?;
        self.profile = profile;
        Ok(self)
    }
}

impl Influencer for Repulser {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn strength(&self) -> f32 {
        self.strength
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn profile(&self) -> InfluenceProfile {
        self.profile
    }
}

/// Attractor whose strength oscillates around a base value. Ships only.
#[derive(Debug, Clone)]
pub struct PulsingWell {
    pub pos: Vec2,
    pub base_strength: f32,
    /// Fraction of `base_strength` added/removed at the peaks (0..=1)
    pub amplitude: f32,
    /// Pulses per second
    pub frequency: f32,
    pub range: f32,
    pub profile: InfluenceProfile,
    phase: f32,
}

impl PulsingWell {
    pub fn new(
        pos: Vec2,
        base_strength: f32,
        amplitude: f32,
        frequency: f32,
        range: f32,
    ) -> Result<Self, ConfigError> {
        validate_source(base_strength, range)?;
        if !(0.0..=1.0).contains(&amplitude) {
            return Err(ConfigError::InvalidAmplitude(amplitude));
        }
        if !frequency.is_finite() || frequency < 0.0 {
            return Err(ConfigError::InvalidFrequency(frequency));
        }
        Ok(Self {
            pos,
            base_strength: base_strength.abs(),
            amplitude,
            frequency,
            range,
            profile: InfluenceProfile::default(),
            phase: 0.0,
        })
    }

    pub fn with_profile(mut self, profile: InfluenceProfile) -> Result<Self, ConfigError> {
        profile.validate()?;
        self.profile = profile;
        Ok(self)
    }
}

impl Influencer for PulsingWell {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn strength(&self) -> f32 {
        self.base_strength * (1.0 + self.amplitude * self.phase.sin())
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn profile(&self) -> InfluenceProfile {
        self.profile
    }

    fn should_effect(&self, target: &dyn Collidable) -> bool {
        target.kind() == BodyKind::Ship
    }

    fn update_influence(&mut self, dt: f32) {
        self.phase = (self.phase + self.frequency * std::f32::consts::TAU * dt)
            % std::f32::consts::TAU;
    }

    fn render_influence(&self, gizmos: &mut Vec<InfluenceGizmo>) {
        // Ring breathes with the pulse
        let t = 0.5 + 0.5 * self.phase.sin();
        gizmos.push(InfluenceGizmo {
            center: self.pos,
            radius: self.range * (0.25 + 0.1 * t),
            color: gizmo_colors::ATTRACT,
        });
    }
}

/// Repelling hazard circling an anchor point. Debris passes through it.
#[derive(Debug, Clone)]
pub struct OrbitingHazard {
    pub anchor: Vec2,
    pub orbit_radius: f32,
    /// Radians per second, sign gives direction
    pub angular_speed: f32,
    pub angle: f32,
    strength: f32,
    pub range: f32,
    pub profile: InfluenceProfile,
}

impl OrbitingHazard {
    pub fn new(
        anchor: Vec2,
        orbit_radius: f32,
        angular_speed: f32,
        magnitude: f32,
        range: f32,
    ) -> Result<Self, ConfigError> {
        validate_source(magnitude, range)?;
        if !orbit_radius.is_finite() || orbit_radius < 0.0 {
            return Err(ConfigError::InvalidRange(orbit_radius));
        }
        validate_angular_speed(angular_speed)?;
        Ok(Self {
            anchor,
            orbit_radius,
            angular_speed,
            angle: 0.0,
            strength: -magnitude.abs(),
            range,
            profile: InfluenceProfile::default(),
        })
    }

    pub fn with_profile(mut self, profile: InfluenceProfile) -> Result<Self, ConfigError> {
        profile.validate()?;
        self.profile = profile;
        Ok(self)
    }
}

impl Influencer for OrbitingHazard {
    fn position(&self) -> Vec2 {
        self.anchor + Vec2::new(self.angle.cos(), self.angle.sin()) * self.orbit_radius
    }

    fn strength(&self) -> f32 {
        self.strength
    }

    fn range(&self) -> f32 {
        self.range
    }

    fn profile(&self) -> InfluenceProfile {
        self.profile
    }

    fn should_effect(&self, target: &dyn Collidable) -> bool {
        target.kind() == BodyKind::Ship
    }

    fn update_influence(&mut self, dt: f32) {
        self.angle = crate::normalize_angle(self.angle + self.angular_speed * dt);
    }

    fn render_influence(&self, gizmos: &mut Vec<InfluenceGizmo>) {
        gizmos.push(InfluenceGizmo {
            center: self.position(),
            radius: 8.0,
            color: gizmo_colors::HAZARD_CORE,
        });
    }
}
