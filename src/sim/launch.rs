//! Drag launcher: press on the home planet, pull, release to launch
//!
//! State machine `Idle -> Dragging -> Idle`. Everything that changes from
//! frame to frame lives in `DragState`, which the tick passes back in.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::{angle_deg, up_rotated};

/// Seconds per frame of the pull indicator animation
pub const PULL_FRAME_TIME: f32 = 0.1;
/// Frames in the pull indicator animation (the last frame holds)
pub const PULL_FRAME_COUNT: usize = 6;

/// Pointer state sampled once per tick, in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub pressed: bool,
    pub just_pressed: bool,
    pub world_pos: Vec2,
}

impl PointerState {
    pub fn press(world_pos: Vec2) -> Self {
        Self {
            pressed: true,
            just_pressed: true,
            world_pos,
        }
    }

    pub fn hold(world_pos: Vec2) -> Self {
        Self {
            pressed: true,
            just_pressed: false,
            world_pos,
        }
    }

    pub fn release(world_pos: Vec2) -> Self {
        Self {
            pressed: false,
            just_pressed: false,
            world_pos,
        }
    }
}

/// Launch tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Pull distance that maps to full strength
    pub max_pull: f32,
    /// Launch speed at full strength
    pub max_launch_speed: f32,
    /// Launch opposite the pull, like a slingshot
    #[serde(default = "default_slingshot")]
    pub slingshot: bool,
}

fn default_slingshot() -> bool {
    true
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_pull: crate::consts::MAX_PULL,
            max_launch_speed: crate::consts::MAX_LAUNCH_SPEED,
            slingshot: true,
        }
    }
}

impl LaunchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_pull.is_finite() || self.max_pull <= 0.0 {
            return Err(ConfigError::InvalidMaxPull(self.max_pull));
        }
        if !self.max_launch_speed.is_finite() || self.max_launch_speed <= 0.0 {
            return Err(ConfigError::InvalidLaunchSpeed(self.max_launch_speed));
        }
        Ok(())
    }
}

/// Circular body the player presses on to start a drag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchTarget {
    pub center: Vec2,
    pub radius: f32,
}

impl LaunchTarget {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        super::collision::circle_contains(self.center, self.radius, point)
    }
}

/// An in-progress drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchGesture {
    /// Target center the pull is measured from
    pub origin: Vec2,
    /// Latest pointer position
    pub current: Vec2,
    /// Direction origin -> pointer in degrees, 0 = up
    pub angle_deg: f32,
    /// Pull distance clamped to `max_pull`
    pub strength: f32,
    /// `strength / max_pull`
    pub normalized_strength: f32,
    /// Time since the press, drives the indicator animation
    pub anim_timer: f32,
    /// Where the pointer went down
    pub press: Vec2,
    /// Whether the pointer has left the press point
    pub moved: bool,
}

impl LaunchGesture {
    fn begin(origin: Vec2, pointer: Vec2, config: &LaunchConfig) -> Self {
        let mut gesture = Self {
            origin,
            current: pointer,
            angle_deg: 0.0,
            strength: 0.0,
            normalized_strength: 0.0,
            anim_timer: 0.0,
            press: pointer,
            moved: false,
        };
        gesture.track(origin, pointer, config);
        gesture
    }

    fn track(&mut self, origin: Vec2, pointer: Vec2, config: &LaunchConfig) {
        let offset = pointer - origin;
        self.origin = origin;
        self.current = pointer;
        self.moved |= pointer != self.press;
        self.angle_deg = angle_deg(offset) - 90.0;
        self.strength = offset.length().clamp(0.0, config.max_pull);
        self.normalized_strength = self.strength / config.max_pull;
    }

    /// Clamped pull vector from the origin toward the pointer
    pub fn pull_vector(&self) -> Vec2 {
        (self.current - self.origin).normalize_or_zero() * self.strength
    }

    /// Where the stretched indicator ends
    pub fn pull_point(&self) -> Vec2 {
        self.origin + self.pull_vector()
    }

    pub fn launch_velocity(&self, config: &LaunchConfig) -> Vec2 {
        let dir = up_rotated(self.angle_deg);
        let dir = if config.slingshot { -dir } else { dir };
        dir * self.normalized_strength * config.max_launch_speed
    }

    fn into_request(self, config: &LaunchConfig) -> LaunchRequest {
        LaunchRequest {
            origin: self.origin,
            angle_deg: self.angle_deg,
            normalized_strength: self.normalized_strength,
            velocity: self.launch_velocity(config),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(LaunchGesture),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn gesture(&self) -> Option<&LaunchGesture> {
        match self {
            DragState::Dragging(g) => Some(g),
            DragState::Idle => None,
        }
    }

    /// Stretch indicator while dragging (presentation only)
    pub fn indicator(&self, config: &LaunchConfig) -> Option<PullIndicator> {
        self.gesture().map(|g| PullIndicator {
            origin: g.origin,
            angle_deg: g.angle_deg,
            scale: g.strength / config.max_pull,
            frame: ((g.anim_timer / PULL_FRAME_TIME) as usize).min(PULL_FRAME_COUNT - 1),
        })
    }
}

/// Everything needed to spawn a projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchRequest {
    pub origin: Vec2,
    pub angle_deg: f32,
    pub normalized_strength: f32,
    pub velocity: Vec2,
}

/// What a drag update did this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Idle,
    Started,
    Dragging,
    Launched(LaunchRequest),
    /// Released without pulling, or cancelled explicitly
    Cancelled,
}

/// Rotated, stretched sprite drawn from the target center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullIndicator {
    pub origin: Vec2,
    pub angle_deg: f32,
    /// Vertical stretch, `strength / max_pull`
    pub scale: f32,
    pub frame: usize,
}

/// Advance the drag state machine by one tick
pub fn update_drag(
    state: &mut DragState,
    pointer: &PointerState,
    target: &LaunchTarget,
    config: &LaunchConfig,
    dt: f32,
) -> DragOutcome {
    if pointer.just_pressed && target.contains(pointer.world_pos) {
        *state = DragState::Dragging(LaunchGesture::begin(target.center, pointer.world_pos, config));
        return DragOutcome::Started;
    }

    match state {
        DragState::Dragging(gesture) if pointer.pressed => {
            gesture.anim_timer += dt;
            gesture.track(target.center, pointer.world_pos, config);
            DragOutcome::Dragging
        }
        DragState::Dragging(gesture) => {
            let mut gesture = *gesture;
            gesture.track(target.center, pointer.world_pos, config);
            *state = DragState::Idle;
            // A tap that never moved is not a pull, wherever it landed
            if gesture.moved && gesture.normalized_strength > 0.0 {
                DragOutcome::Launched(gesture.into_request(config))
            } else {
                DragOutcome::Cancelled
            }
        }
        DragState::Idle => DragOutcome::Idle,
    }
}

/// Abandon any drag in progress without launching
pub fn cancel_drag(state: &mut DragState) -> DragOutcome {
    match std::mem::take(state) {
        DragState::Dragging(_) => DragOutcome::Cancelled,
        DragState::Idle => DragOutcome::Idle,
    }
}
