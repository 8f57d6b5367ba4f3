//! Seeded world population
//!
//! Scatters planets, repulsers, pulsing wells, orbiting hazards and asteroids
//! across the world. The same seed and settings always give the same layout.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::influencers::{GravityWell, OrbitingHazard, PulsingWell, Repulser};
use super::state::GameState;
use crate::consts::*;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Placement attempts per body before it is skipped
const MAX_PLACEMENT_ATTEMPTS: u32 = 64;

/// Clear space kept around the home planet
const HOME_CLEARANCE: f32 = HOME_REVEAL_RADIUS + 80.0;

/// Margin between bodies and the world edge
const EDGE_MARGIN: f32 = 120.0;

/// Gap between planet surfaces
const PLANET_SPACING: f32 = 160.0;

/// Occupied circles used for rejection sampling
struct Placer {
    rng: Pcg32,
    world: Vec2,
    home: Vec2,
    taken: Vec<(Vec2, f32)>,
}

impl Placer {
    fn new(seed: u64, world: Vec2, home: Vec2) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            world,
            home,
            taken: Vec::new(),
        }
    }

    /// Find a free spot for a body of `radius`, or None if the world is too crowded
    fn place(&mut self, radius: f32, spacing: f32) -> Option<Vec2> {
        let margin = EDGE_MARGIN.min(self.world.x / 4.0).min(self.world.y / 4.0);
        let lo = Vec2::splat(margin);
        let hi = self.world - Vec2::splat(margin);
        if hi.x <= lo.x || hi.y <= lo.y {
            return None;
        }

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let pos = Vec2::new(
                self.rng.random_range(lo.x..hi.x),
                self.rng.random_range(lo.y..hi.y),
            );
            if pos.distance(self.home) < HOME_CLEARANCE + radius {
                continue;
            }
            let clear = self
                .taken
                .iter()
                .all(|&(c, r)| pos.distance(c) >= r + radius + spacing);
            if clear {
                self.taken.push((pos, radius));
                return Some(pos);
            }
        }
        None
    }
}

/// Fill an empty session with seeded bodies
pub fn populate(state: &mut GameState, settings: &Settings) -> Result<(), ConfigError> {
    let world = state.world_size();
    let tuning = &settings.world;
    let field = &settings.field;
    let mut placer = Placer::new(state.seed, world, state.home.center());
    let mut skipped = 0u32;

    for _ in 0..tuning.planet_count {
        let radius = placer.rng.random_range(24.0..56.0);
        let strength = placer.rng.random_range(120.0..240.0);
        let Some(pos) = placer.place(radius, PLANET_SPACING) else {
            skipped += 1;
            continue;
        };
        let well = GravityWell::new(pos, strength, radius * 6.0)?.with_profile(field.well)?;
        state.add_planet(pos, radius, Box::new(well));
    }

    for _ in 0..tuning.repulser_count {
        let Some(pos) = placer.place(REPULSER_RANGE * 0.5, 40.0) else {
            skipped += 1;
            continue;
        };
        let repulser = Repulser::new(pos, REPULSER_STRENGTH, REPULSER_RANGE)?
            .with_profile(field.repulser)?;
        state.add_influencer(Box::new(repulser));
    }

    for _ in 0..tuning.pulsar_count {
        let base = placer.rng.random_range(150.0..260.0);
        let frequency = placer.rng.random_range(0.2..0.6);
        let range = placer.rng.random_range(220.0..340.0);
        let Some(pos) = placer.place(range * 0.3, 60.0) else {
            skipped += 1;
            continue;
        };
        let pulsar = PulsingWell::new(pos, base, 0.6, frequency, range)?
            .with_profile(field.pulsar)?;
        state.add_influencer(Box::new(pulsar));
    }

    for _ in 0..tuning.hazard_count {
        let orbit = placer.rng.random_range(90.0..180.0);
        let mut speed: f32 = placer.rng.random_range(0.4..1.2);
        if placer.rng.random_bool(0.5) {
            speed = -speed;
        }
        let Some(anchor) = placer.place(orbit + 40.0, 40.0) else {
            skipped += 1;
            continue;
        };
        let hazard = OrbitingHazard::new(anchor, orbit, speed, 400.0, 60.0)?
            .with_profile(field.hazard)?;
        state.add_influencer(Box::new(hazard));
    }

    // Asteroids may drift anywhere, only the home system is kept clear
    for _ in 0..tuning.asteroid_count {
        let radius = placer.rng.random_range(6.0..18.0);
        let Some(pos) = placer.place(radius, 0.0) else {
            skipped += 1;
            continue;
        };
        let angle = placer.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = placer.rng.random_range(10.0..40.0);
        let spin = placer.rng.random_range(-1.5..1.5);
        state.spawn_asteroid(pos, Vec2::from_angle(angle) * speed, radius, spin)?;
    }

    if skipped > 0 {
        log::warn!("World too crowded: skipped {} bodies", skipped);
    }
    state.normalize_order();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::influence::BodyKind;

    #[test]
    fn test_same_seed_same_layout() {
        let settings = Settings::default();
        let a = GameState::new(7, &settings).unwrap();
        let b = GameState::new(7, &settings).unwrap();
        let pa: Vec<Vec2> = a.planets.iter().map(|p| p.pos).collect();
        let pb: Vec<Vec2> = b.planets.iter().map(|p| p.pos).collect();
        assert_eq!(pa, pb);
        assert_eq!(a.field.len(), b.field.len());
        let aa: Vec<Vec2> = a.asteroids.iter().map(|x| x.vel).collect();
        let ab: Vec<Vec2> = b.asteroids.iter().map(|x| x.vel).collect();
        assert_eq!(aa, ab);
    }

    #[test]
    fn test_different_seed_different_layout() {
        let settings = Settings::default();
        let a = GameState::new(1, &settings).unwrap();
        let b = GameState::new(2, &settings).unwrap();
        let pa: Vec<Vec2> = a.planets.iter().map(|p| p.pos).collect();
        let pb: Vec<Vec2> = b.planets.iter().map(|p| p.pos).collect();
        assert_ne!(pa, pb);
    }

    #[test]
    fn test_default_world_is_fully_populated() {
        let settings = Settings::default();
        let state = GameState::new(99, &settings).unwrap();
        let w = &settings.world;
        assert_eq!(state.planets.len(), w.planet_count as usize);
        assert_eq!(state.asteroids.len(), w.asteroid_count as usize);
        assert_eq!(
            state.field.len(),
            (w.planet_count + w.repulser_count + w.pulsar_count + w.hazard_count) as usize
        );
    }

    #[test]
    fn test_home_system_is_clear() {
        let state = GameState::new(3, &Settings::default()).unwrap();
        let home = state.home.center();
        for planet in &state.planets {
            assert!(planet.pos.distance(home) >= HOME_CLEARANCE);
        }
        // Nothing pulls on a ship resting at the launch point
        assert_eq!(state.force_at(home, BodyKind::Ship), Vec2::ZERO);
    }

    #[test]
    fn test_tiny_world_skips_instead_of_failing() {
        let mut settings = Settings::default();
        settings.world.width = 400.0;
        settings.world.height = 400.0;
        let state = GameState::new(5, &settings).unwrap();
        assert!(state.planets.is_empty());
        assert!(state.field.is_empty());
    }
}
