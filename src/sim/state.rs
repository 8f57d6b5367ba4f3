//! Game state and core simulation types
//!
//! One `GameState` per session. It owns the influence field, the fog mask and
//! the drag state; nothing here is global.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::fog::FogOfWar;
use super::influence::{
    BodyKind, Collidable, InfluenceField, Influencer, InfluencerId, SamplePoint,
    validate_angular_speed,
};
use super::launch::{DragState, LaunchConfig, LaunchRequest, LaunchTarget};
use super::world_setup;
use crate::consts::*;
use crate::error::ConfigError;
use crate::settings::{Settings, ShipTuning};

/// The home planet the player launches from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomePlanet {
    pub target: LaunchTarget,
    /// Spin animation clock
    pub spin: f32,
}

impl HomePlanet {
    pub fn new(center: Vec2) -> Self {
        Self {
            target: LaunchTarget::new(center, EARTH_SIZE / 2.0),
            spin: 0.0,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.target.center
    }
}

/// A planet with a gravity well
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: u32,
    pub pos: Vec2,
    /// Surface radius; ships touching it crash
    pub radius: f32,
    pub well: InfluencerId,
}

/// A player-launched ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub reveal_radius: f32,
    /// Seconds since launch
    pub age: f32,
}

impl Collidable for Ship {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Ship
    }
}

/// Drifting debris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Sprite rotation (radians) and spin rate
    pub rotation: f32,
    pub spin: f32,
}

impl Collidable for Asteroid {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn kind(&self) -> BodyKind {
        BodyKind::Debris
    }
}

/// Gameplay events, drained by the caller after each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShipLaunched { id: u32, velocity: Vec2 },
    /// Ship hit a planet surface
    ShipCrashed { id: u32, planet: u32 },
    /// Ship left the world
    ShipLost { id: u32 },
    /// Ship ran out of lifetime
    ShipExpired { id: u32 },
    /// Drag released without pulling, or cancelled
    LaunchCancelled,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Session clock in seconds
    pub clock: f32,
    pub home: HomePlanet,
    /// Planets (sorted by id for determinism)
    pub planets: Vec<Planet>,
    /// Flying ships (sorted by id for determinism)
    pub ships: Vec<Ship>,
    /// Asteroids (sorted by id for determinism)
    pub asteroids: Vec<Asteroid>,
    pub field: InfluenceField,
    pub fog: FogOfWar,
    pub drag: DragState,
    pub launch: LaunchConfig,
    pub ship_tuning: ShipTuning,
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Empty session: home planet at the world center, nothing else
    pub fn empty(seed: u64, settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let world = Vec2::new(settings.world.width, settings.world.height);
        let fog = FogOfWar::new(
            world.x,
            world.y,
            settings.fog.cell_size,
            settings.fog.edge_softness,
        )?;

        Ok(Self {
            seed,
            time_ticks: 0,
            clock: 0.0,
            home: HomePlanet::new(world / 2.0),
            planets: Vec::new(),
            ships: Vec::new(),
            asteroids: Vec::new(),
            field: InfluenceField::new(),
            fog,
            drag: DragState::Idle,
            launch: settings.launch,
            ship_tuning: settings.ship,
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Create a populated session with the given seed
    pub fn new(seed: u64, settings: &Settings) -> Result<Self, ConfigError> {
        let mut state = Self::empty(seed, settings)?;
        world_setup::populate(&mut state, settings)?;

        // Home system starts explored
        let home = state.home.center();
        state.fog.add_fog_circle(home.x, home.y, HOME_REVEAL_RADIUS);
        state.fog.update(0.0);

        log::info!(
            "Session seed {}: {} planets, {} influencers, {} asteroids, fog {}x{}",
            seed,
            state.planets.len(),
            state.field.len(),
            state.asteroids.len(),
            state.fog.cols(),
            state.fog.rows()
        );
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn world_size(&self) -> Vec2 {
        self.fog.world_size()
    }

    pub fn add_influencer(&mut self, source: Box<dyn Influencer>) -> InfluencerId {
        self.field.register(source)
    }

    pub fn remove_influencer(&mut self, id: InfluencerId) -> Option<Box<dyn Influencer>> {
        self.field.remove(id)
    }

    /// Add a planet and register its gravity well
    pub fn add_planet(&mut self, pos: Vec2, radius: f32, well: Box<dyn Influencer>) -> u32 {
        let id = self.next_entity_id();
        let well = self.field.register(well);
        self.planets.push(Planet {
            id,
            pos,
            radius,
            well,
        });
        id
    }

    /// Remove a planet along with its gravity well
    pub fn remove_planet(&mut self, id: u32) -> Option<Planet> {
        let idx = self.planets.iter().position(|p| p.id == id)?;
        let planet = self.planets.remove(idx);
        self.field.remove(planet.well);
        Some(planet)
    }

    pub fn spawn_asteroid(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        spin: f32,
    ) -> Result<u32, ConfigError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidRange(radius));
        }
        validate_angular_speed(spin)?;
        let id = self.next_entity_id();
        self.asteroids.push(Asteroid {
            id,
            pos,
            vel,
            radius,
            rotation: 0.0,
            spin,
        });
        Ok(id)
    }

    /// Spawn a ship on the home planet's rim, heading along the launch velocity
    pub fn spawn_ship(&mut self, request: &LaunchRequest) -> u32 {
        let id = self.next_entity_id();
        let tuning = self.ship_tuning;
        let dir = request.velocity.normalize_or_zero();
        let pos = self.home.center() + dir * (self.home.target.radius + tuning.radius + 2.0);
        self.ships.push(Ship {
            id,
            pos,
            vel: request.velocity,
            radius: tuning.radius,
            reveal_radius: tuning.reveal_radius,
            age: 0.0,
        });
        self.events.push(GameEvent::ShipLaunched {
            id,
            velocity: request.velocity,
        });
        log::debug!(
            "Ship {} launched at {:.1} deg, power {:.2}",
            id,
            request.angle_deg,
            request.normalized_strength
        );
        id
    }

    /// Net influence at an arbitrary point, for trajectory previews
    pub fn force_at(&self, pos: Vec2, kind: BodyKind) -> Vec2 {
        self.field.compute_force(&SamplePoint { pos, kind })
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.planets.sort_by_key(|p| p.id);
        self.ships.sort_by_key(|s| s.id);
        self.asteroids.sort_by_key(|a| a.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::influencers::GravityWell;

    fn small_settings() -> Settings {
        let mut settings = Settings::default();
        settings.world.width = 2000.0;
        settings.world.height = 1200.0;
        settings
    }

    #[test]
    fn test_new_state_reveals_home() {
        let state = GameState::new(42, &small_settings()).unwrap();
        let home = state.home.center();
        assert_eq!(home, Vec2::new(1000.0, 600.0));
        assert!(state.fog.is_revealed(home.x, home.y));
        assert!(!state.fog.is_revealed(10.0, 10.0));
        assert!(state.ships.is_empty());
    }

    #[test]
    fn test_invalid_settings_fail_at_setup() {
        let mut settings = small_settings();
        settings.fog.cell_size = -1.0;
        assert!(GameState::new(1, &settings).is_err());
    }

    #[test]
    fn test_planet_lifecycle_tracks_well() {
        let mut state = GameState::empty(1, &small_settings()).unwrap();
        let well = GravityWell::new(Vec2::new(300.0, 300.0), 100.0, 200.0).unwrap();
        let id = state.add_planet(Vec2::new(300.0, 300.0), 40.0, Box::new(well));
        assert_eq!(state.field.len(), 1);
        assert!(state.force_at(Vec2::new(350.0, 300.0), BodyKind::Ship).x < 0.0);

        let planet = state.remove_planet(id).unwrap();
        assert!(!state.field.contains(planet.well));
        assert_eq!(state.force_at(Vec2::new(350.0, 300.0), BodyKind::Ship), Vec2::ZERO);
        assert!(state.remove_planet(id).is_none());
    }

    #[test]
    fn test_spawn_ship_on_rim() {
        let mut state = GameState::empty(1, &small_settings()).unwrap();
        let request = LaunchRequest {
            origin: state.home.center(),
            angle_deg: 90.0,
            normalized_strength: 1.0,
            velocity: Vec2::new(-100.0, 0.0),
        };
        let id = state.spawn_ship(&request);
        let ship = &state.ships[0];
        assert_eq!(ship.id, id);
        assert!(ship.pos.x < state.home.center().x - state.home.target.radius);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ShipLaunched {
                id,
                velocity: Vec2::new(-100.0, 0.0)
            }]
        );
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::empty(1, &small_settings()).unwrap();
        let a = state.spawn_asteroid(Vec2::ZERO, Vec2::ZERO, 10.0, 0.0).unwrap();
        let b = state.spawn_asteroid(Vec2::ZERO, Vec2::ZERO, 10.0, 0.0).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_spawn_asteroid_rejects_bad_spin_and_radius() {
        let mut state = GameState::empty(1, &small_settings()).unwrap();
        for spin in [f32::INFINITY, f32::NAN, 1.0e12] {
            assert!(matches!(
                state.spawn_asteroid(Vec2::ZERO, Vec2::ZERO, 10.0, spin),
                Err(ConfigError::InvalidAngularSpeed(_))
            ));
        }
        assert!(matches!(
            state.spawn_asteroid(Vec2::ZERO, Vec2::ZERO, 0.0, 1.0),
            Err(ConfigError::InvalidRange(_))
        ));
        assert!(state.asteroids.is_empty());
    }

    #[test]
    fn test_planet_round_trips_through_json() {
        let mut state = GameState::empty(1, &small_settings()).unwrap();
        let pos = Vec2::new(400.0, 300.0);
        let well = GravityWell::new(pos, 200.0, 150.0).unwrap();
        let id = state.add_planet(pos, 30.0, Box::new(well));
        let planet = state.planets.iter().find(|p| p.id == id).unwrap();

        let json = serde_json::to_string(planet).unwrap();
        let back: Planet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, planet.id);
        assert_eq!(back.pos, planet.pos);
        assert_eq!(back.well, planet.well);
        assert!(state.field.contains(back.well));
    }
}
