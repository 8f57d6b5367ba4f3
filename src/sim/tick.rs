//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::collision::{circles_overlap, outside_world, reflect_velocity, world_wall_collision};
use super::influence::BodyKind;
use super::launch::{DragOutcome, PointerState, cancel_drag, update_drag};
use super::state::{GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer in world coordinates
    pub pointer: PointerState,
    /// Abandon the current drag (escape / focus lost)
    pub cancel_drag: bool,
}

/// Debris speed cap, well below ship speed
const ASTEROID_MAX_SPEED: f32 = 120.0;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;
    state.clock += dt;
    state.home.spin += dt;

    // Moving sources first so every body sees the same field this tick
    state.field.update(dt);

    let outcome = if input.cancel_drag {
        cancel_drag(&mut state.drag)
    } else {
        let target = state.home.target;
        let launch = state.launch;
        update_drag(&mut state.drag, &input.pointer, &target, &launch, dt)
    };
    match outcome {
        DragOutcome::Launched(request) => {
            state.spawn_ship(&request);
        }
        DragOutcome::Cancelled => state.events.push(GameEvent::LaunchCancelled),
        DragOutcome::Idle | DragOutcome::Started | DragOutcome::Dragging => {}
    }

    update_ships(state, dt);
    update_asteroids(state, dt);

    // Ships light up the fog around them, applied in the same tick
    for ship in &state.ships {
        state
            .fog
            .add_fog_circle(ship.pos.x, ship.pos.y, ship.reveal_radius);
    }
    state.fog.update(dt);
}

fn update_ships(state: &mut GameState, dt: f32) {
    let world = state.world_size();
    let max_speed = state.ship_tuning.max_speed;
    let lifetime = state.ship_tuning.lifetime;

    for i in 0..state.ships.len() {
        let force = state.field.compute_force(&state.ships[i]);
        let ship = &mut state.ships[i];
        ship.vel = (ship.vel + force * dt).clamp_length_max(max_speed);
        ship.pos += ship.vel * dt;
        ship.age += dt;
    }

    let planets = &state.planets;
    let events = &mut state.events;
    state.ships.retain(|ship| {
        if let Some(planet) = planets
            .iter()
            .find(|p| circles_overlap(ship.pos, ship.radius, p.pos, p.radius))
        {
            log::debug!("Ship {} crashed into planet {}", ship.id, planet.id);
            events.push(GameEvent::ShipCrashed {
                id: ship.id,
                planet: planet.id,
            });
            return false;
        }
        if outside_world(ship.pos, ship.reveal_radius, world) {
            log::debug!("Ship {} lost at {:?}", ship.id, ship.pos);
            events.push(GameEvent::ShipLost { id: ship.id });
            return false;
        }
        if ship.age >= lifetime {
            events.push(GameEvent::ShipExpired { id: ship.id });
            return false;
        }
        true
    });
}

fn update_asteroids(state: &mut GameState, dt: f32) {
    let world = state.world_size();

    for i in 0..state.asteroids.len() {
        let force = state.field.compute_force(&state.asteroids[i]);
        let rock = &mut state.asteroids[i];
        rock.vel = (rock.vel + force * dt).clamp_length_max(ASTEROID_MAX_SPEED);
        rock.pos += rock.vel * dt;
        rock.rotation = crate::normalize_angle(rock.rotation + rock.spin * dt);

        let wall = world_wall_collision(rock.pos, rock.radius, world);
        if wall.hit {
            rock.pos += wall.normal * wall.penetration;
            // Only bounce when moving into the wall
            if rock.vel.dot(wall.normal) < 0.0 {
                rock.vel = reflect_velocity(rock.vel, wall.normal);
            }
        }
    }
}

/// Positions a ship launched from `start` would pass through over `steps` ticks.
/// Ignores crashes; used to draw a short trajectory preview while dragging.
pub fn preview_trajectory(
    state: &GameState,
    start: Vec2,
    velocity: Vec2,
    steps: usize,
    dt: f32,
) -> Vec<Vec2> {
    let max_speed = state.ship_tuning.max_speed;
    let mut pos = start;
    let mut vel = velocity;
    let mut points = Vec::with_capacity(steps);
    for _ in 0..steps {
        let force = state.force_at(pos, BodyKind::Ship);
        vel = (vel + force * dt).clamp_length_max(max_speed);
        pos += vel * dt;
        points.push(pos);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::influencers::{GravityWell, Repulser};

    fn empty_state() -> GameState {
        let mut settings = Settings::default();
        settings.world.width = 3000.0;
        settings.world.height = 2000.0;
        GameState::empty(11, &settings).unwrap()
    }

    fn drag(state: &mut GameState, to: Vec2) {
        let home = state.home.center();
        tick(state, &TickInput { pointer: PointerState::press(home), ..Default::default() }, SIM_DT);
        tick(state, &TickInput { pointer: PointerState::hold(to), ..Default::default() }, SIM_DT);
    }

    fn release(state: &mut GameState, at: Vec2) {
        tick(state, &TickInput { pointer: PointerState::release(at), ..Default::default() }, SIM_DT);
    }

    #[test]
    fn test_drag_release_launches_ship() {
        let mut state = empty_state();
        let home = state.home.center();
        let pull = home + Vec2::new(0.0, -50.0);
        drag(&mut state, pull);
        assert!(state.drag.is_dragging());
        release(&mut state, pull);

        assert!(!state.drag.is_dragging());
        assert_eq!(state.ships.len(), 1);
        let ship = &state.ships[0];
        // Pulled down by half the max pull: flies up at half speed
        assert!((ship.vel.length() - state.launch.max_launch_speed * 0.5).abs() < 1e-2);
        assert!(ship.vel.y > 0.0);
        assert!(matches!(state.drain_events()[0], GameEvent::ShipLaunched { .. }));
    }

    #[test]
    fn test_release_without_pull_cancels() {
        let mut state = empty_state();
        let home = state.home.center();
        drag(&mut state, home);
        release(&mut state, home);
        assert!(state.ships.is_empty());
        assert_eq!(state.drain_events(), vec![GameEvent::LaunchCancelled]);
    }

    #[test]
    fn test_cancel_input_aborts_drag() {
        let mut state = empty_state();
        let home = state.home.center();
        drag(&mut state, home + Vec2::new(80.0, 0.0));
        tick(&mut state, &TickInput { cancel_drag: true, ..Default::default() }, SIM_DT);
        assert!(!state.drag.is_dragging());
        release(&mut state, home + Vec2::new(80.0, 0.0));
        assert!(state.ships.is_empty());
    }

    #[test]
    fn test_flying_ship_reveals_fog() {
        let mut state = empty_state();
        let home = state.home.center();
        let pull = home + Vec2::new(-100.0, 0.0);
        drag(&mut state, pull);
        release(&mut state, pull);

        let before = state.fog.revealed_fraction();
        let mut previous = state.fog.mask().to_vec();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            // Mask never loses coverage
            assert!(state.fog.mask().iter().zip(&previous).all(|(now, was)| now >= was));
            previous = state.fog.mask().to_vec();
        }
        assert!(state.fog.revealed_fraction() > before);
        let ship = &state.ships[0];
        assert!(state.fog.is_revealed(ship.pos.x, ship.pos.y));
        assert!(state.fog.pending().is_empty());
    }

    #[test]
    fn test_ship_crashes_into_planet() {
        let mut state = empty_state();
        let home = state.home.center();
        let planet_pos = home + Vec2::new(200.0, 0.0);
        let well = GravityWell::new(planet_pos, 500.0, 400.0).unwrap();
        let planet = state.add_planet(planet_pos, 40.0, Box::new(well));

        // Pull left to fire right, straight at the planet
        let pull = home + Vec2::new(-100.0, 0.0);
        drag(&mut state, pull);
        release(&mut state, pull);
        let id = state.ships[0].id;
        for _ in 0..240 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.ships.is_empty());
        assert!(state.drain_events().contains(&GameEvent::ShipCrashed { id, planet }));
    }

    #[test]
    fn test_ship_expires() {
        let mut state = empty_state();
        state.ship_tuning.lifetime = 0.1;
        let home = state.home.center();
        let pull = home + Vec2::new(0.0, -10.0);
        drag(&mut state, pull);
        release(&mut state, pull);
        let id = state.ships[0].id;
        for _ in 0..24 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.ships.is_empty());
        assert!(state.drain_events().contains(&GameEvent::ShipExpired { id }));
    }

    #[test]
    fn test_ship_lost_outside_world() {
        let mut state = empty_state();
        let id = state.spawn_ship(&crate::sim::launch::LaunchRequest {
            origin: state.home.center(),
            angle_deg: 0.0,
            normalized_strength: 1.0,
            velocity: Vec2::ZERO,
        });
        state.ships[0].pos = Vec2::new(-500.0, 100.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.ships.is_empty());
        assert!(state.drain_events().contains(&GameEvent::ShipLost { id }));
    }

    #[test]
    fn test_asteroids_bounce_off_walls() {
        let mut state = empty_state();
        state.spawn_asteroid(Vec2::new(12.0, 500.0), Vec2::new(-60.0, 0.0), 10.0, 0.0).unwrap();
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let rock = &state.asteroids[0];
        assert!(rock.vel.x > 0.0);
        assert!(rock.pos.x >= rock.radius - 1e-3);
    }

    #[test]
    fn test_repulser_pushes_debris() {
        let mut state = empty_state();
        state.add_influencer(Box::new(Repulser::test(Vec2::new(1000.0, 1000.0))));
        state.spawn_asteroid(Vec2::new(1050.0, 1000.0), Vec2::ZERO, 8.0, 0.0).unwrap();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.asteroids[0].vel.x > 0.0);
    }

    #[test]
    fn test_preview_bends_toward_well() {
        let mut state = empty_state();
        let well = GravityWell::new(Vec2::new(1500.0, 1200.0), 800.0, 600.0).unwrap();
        state.add_planet(Vec2::new(1500.0, 1200.0), 30.0, Box::new(well));
        let start = Vec2::new(1300.0, 1000.0);
        let path = preview_trajectory(&state, start, Vec2::new(100.0, 0.0), 60, SIM_DT);
        assert_eq!(path.len(), 60);
        assert!(path[59].y > start.y);
    }

    #[test]
    fn test_same_seed_same_run() {
        let settings = Settings::default();
        let mut a = GameState::new(21, &settings).unwrap();
        let mut b = GameState::new(21, &settings).unwrap();
        let home = a.home.center();
        let pull = home + Vec2::new(30.0, -70.0);
        for state in [&mut a, &mut b] {
            drag(state, pull);
            release(state, pull);
            for _ in 0..600 {
                tick(state, &TickInput::default(), SIM_DT);
            }
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.fog.mask(), b.fog.mask());
        assert_eq!(a.drain_events(), b.drain_events());
    }
}
