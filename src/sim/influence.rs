//! Influence field: cumulative gravity/repulsion from independent sources
//!
//! Influencers are force sources (wells, repulsers, hazards). Collidables are
//! the bodies they act on. The field never mutates a body; it returns a force
//! vector and the caller integrates it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_ANGULAR_SPEED;
use crate::error::ConfigError;
use crate::smoothstep;

/// Broad category of a body, used by influencer inclusion predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyKind {
    /// Player-launched ship
    Ship,
    /// Drifting asteroid debris
    Debris,
}

/// Anything that can be the target of influence
pub trait Collidable {
    /// World-space position used for distance computation
    fn position(&self) -> Vec2;

    fn kind(&self) -> BodyKind {
        BodyKind::Ship
    }
}

/// A bare position standing in for a body (force queries, tooling)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub pos: Vec2,
    pub kind: BodyKind,
}

impl SamplePoint {
    pub fn ship(pos: Vec2) -> Self {
        Self {
            pos,
            kind: BodyKind::Ship,
        }
    }
}

impl Collidable for SamplePoint {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn kind(&self) -> BodyKind {
        self.kind
    }
}

/// How contribution magnitude decays with distance inside the range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum Falloff {
    /// Full strength everywhere inside the range
    Constant,
    /// Full strength at the source, zero at the range
    Linear,
    /// `core / d`, saturating at full strength inside `core`
    InverseDistance { core: f32 },
    /// `(core / d)^2`, saturating at full strength inside `core`
    InverseSquare { core: f32 },
}

impl Default for Falloff {
    fn default() -> Self {
        Falloff::InverseDistance { core: 32.0 }
    }
}

impl Falloff {
    /// Scale factor in (0, 1] for `distance` strictly inside `range`
    pub fn factor(&self, distance: f32, range: f32) -> f32 {
        match *self {
            Falloff::Constant => 1.0,
            Falloff::Linear => {
                if range <= 0.0 {
                    0.0
                } else {
                    (1.0 - distance / range).max(0.0)
                }
            }
            Falloff::InverseDistance { core } => core / distance.max(core),
            Falloff::InverseSquare { core } => {
                let f = core / distance.max(core);
                f * f
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Falloff::Constant | Falloff::Linear => Ok(()),
            Falloff::InverseDistance { core } | Falloff::InverseSquare { core } => {
                if core.is_finite() && core > 0.0 {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidFalloff(format!(
                        "core distance must be positive, got {core}"
                    )))
                }
            }
        }
    }
}

/// Behavior at the edge of an influencer's range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Cutoff {
    /// Contribution drops straight to zero at the range
    #[default]
    Hard,
    /// Contribution fades out over the last `width` units before the range
    Smooth { width: f32 },
}

impl Cutoff {
    /// Edge multiplier; zero at and beyond the range for every mode
    pub fn edge_factor(&self, distance: f32, range: f32) -> f32 {
        if distance >= range {
            return 0.0;
        }
        match *self {
            Cutoff::Hard => 1.0,
            Cutoff::Smooth { width } => {
                if width <= 0.0 {
                    1.0
                } else {
                    smoothstep(0.0, width, range - distance)
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Cutoff::Hard => Ok(()),
            Cutoff::Smooth { width } if width.is_finite() && width >= 0.0 => Ok(()),
            Cutoff::Smooth { width } => Err(ConfigError::InvalidFalloff(format!(
                "smooth cutoff width must be non-negative, got {width}"
            ))),
        }
    }
}

/// Falloff curve and edge behavior, tunable per influencer variant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InfluenceProfile {
    pub falloff: Falloff,
    #[serde(default)]
    pub cutoff: Cutoff,
}

impl InfluenceProfile {
    pub fn new(falloff: Falloff, cutoff: Cutoff) -> Self {
        Self { falloff, cutoff }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.falloff.validate()?;
        self.cutoff.validate()
    }
}

/// Presentation-only shape emitted by influencer render hooks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfluenceGizmo {
    pub center: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
}

/// Gizmo colors
pub mod gizmo_colors {
    pub const ATTRACT: [f32; 4] = [0.2, 0.5, 1.0, 0.5];
    pub const REPEL: [f32; 4] = [1.0, 0.0, 0.0, 0.5];
    pub const HAZARD_CORE: [f32; 4] = [1.0, 0.6, 0.1, 0.8];
}

/// A single force source
pub trait Influencer: std::fmt::Debug {
    fn position(&self) -> Vec2;

    /// Signed strength: positive attracts, negative repels
    fn strength(&self) -> f32;

    /// Radius beyond which the influencer has no effect
    fn range(&self) -> f32;

    fn profile(&self) -> InfluenceProfile {
        InfluenceProfile::default()
    }

    /// Inclusion predicate: whether this influencer acts on `target`
    fn should_effect(&self, target: &dyn Collidable) -> bool {
        let _ = target;
        true
    }

    /// Per-tick hook for sources that move or pulse
    fn update_influence(&mut self, dt: f32) {
        let _ = dt;
    }

    /// Gameplay visualization (always drawn)
    fn render_influence(&self, gizmos: &mut Vec<InfluenceGizmo>) {
        let _ = gizmos;
    }

    /// Debug visualization of the effective range
    fn debug_render(&self, gizmos: &mut Vec<InfluenceGizmo>) {
        let color = if self.strength() < 0.0 {
            gizmo_colors::REPEL
        } else {
            gizmo_colors::ATTRACT
        };
        gizmos.push(InfluenceGizmo {
            center: self.position(),
            radius: self.range(),
            color,
        });
    }
}

/// Check source parameters at construction
pub fn validate_source(strength: f32, range: f32) -> Result<(), ConfigError> {
    if !strength.is_finite() {
        return Err(ConfigError::InvalidStrength(strength));
    }
    if !range.is_finite() || range < 0.0 {
        return Err(ConfigError::InvalidRange(range));
    }
    Ok(())
}

/// Check a rotation rate in radians per second
pub fn validate_angular_speed(speed: f32) -> Result<(), ConfigError> {
    if !speed.is_finite() || speed.abs() > MAX_ANGULAR_SPEED {
        return Err(ConfigError::InvalidAngularSpeed(speed));
    }
    Ok(())
}

/// Force exerted by one influencer on `target`, ignoring the inclusion predicate
pub fn contribution<T: Influencer + ?Sized>(influencer: &T, target: Vec2) -> Vec2 {
    let strength = influencer.strength();
    let range = influencer.range();
    if strength == 0.0 || range <= 0.0 {
        return Vec2::ZERO;
    }

    let offset = influencer.position() - target;
    let distance = offset.length();
    // Coincident positions have no defined direction
    if distance == 0.0 || distance >= range {
        return Vec2::ZERO;
    }

    let profile = influencer.profile();
    let scale = profile.falloff.factor(distance, range) * profile.cutoff.edge_factor(distance, range);

    // Signed strength flips the unit vector for repulsers
    offset / distance * strength * scale
}

/// Net force on `target` from every influencer that admits it
pub fn net_force<'a, T, I>(target: &dyn Collidable, influencers: I) -> Vec2
where
    T: Influencer + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let pos = target.position();
    influencers
        .into_iter()
        .filter(|i| i.should_effect(target))
        .map(|i| contribution(i, pos))
        .fold(Vec2::ZERO, |acc, f| acc + f)
}

/// Handle for a registered influencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InfluencerId(pub u32);

#[derive(Debug)]
struct Registration {
    id: InfluencerId,
    source: Box<dyn Influencer>,
}

/// Registry of active influencers, iterated in registration order
#[derive(Debug, Default)]
pub struct InfluenceField {
    entries: Vec<Registration>,
    next_id: u32,
}

impl InfluenceField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: Box<dyn Influencer>) -> InfluencerId {
        let id = InfluencerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Registration { id, source });
        id
    }

    /// Unregister and hand the influencer back to its owner
    pub fn remove(&mut self, id: InfluencerId) -> Option<Box<dyn Influencer>> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx).source)
    }

    pub fn get(&self, id: InfluencerId) -> Option<&dyn Influencer> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &*e.source)
    }

    pub fn contains(&self, id: InfluencerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Influencer + 'static)> + '_ {
        self.entries.iter().map(|e| &*e.source)
    }

    /// Advance every influencer by one tick
    pub fn update(&mut self, dt: f32) {
        for entry in &mut self.entries {
            entry.source.update_influence(dt);
        }
    }

    pub fn compute_force(&self, target: &dyn Collidable) -> Vec2 {
        net_force(target, self.iter())
    }

    /// Gameplay gizmos, plus range circles when `debug` is set
    pub fn gizmos(&self, debug: bool) -> Vec<InfluenceGizmo> {
        let mut out = Vec::new();
        for source in self.iter() {
            source.render_influence(&mut out);
            if debug {
                source.debug_render(&mut out);
            }
        }
        out
    }
}
