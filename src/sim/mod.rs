//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod fog;
pub mod influence;
pub mod influencers;
pub mod launch;
pub mod state;
pub mod tick;
pub mod world_setup;

pub use collision::{CollisionResult, circle_contains, circles_overlap, reflect_velocity};
pub use fog::{FogOfWar, FogSnapshot, MaskTexture, RevealCircle};
pub use influence::{
    BodyKind, Collidable, Cutoff, Falloff, InfluenceField, InfluenceGizmo, InfluenceProfile,
    Influencer, InfluencerId, SamplePoint,
};
pub use influencers::{GravityWell, OrbitingHazard, PulsingWell, Repulser};
pub use launch::{
    DragOutcome, DragState, LaunchConfig, LaunchRequest, LaunchTarget, PointerState,
    PullIndicator, cancel_drag, update_drag,
};
pub use state::{Asteroid, GameEvent, GameState, HomePlanet, Planet, Ship};
pub use tick::{TickInput, preview_trajectory, tick};
