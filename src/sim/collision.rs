//! Circle hit tests and bounce response
//!
//! Bodies, planets and the launch target are all circles, and the world is
//! an axis-aligned box with its origin at the bottom-left corner.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward the body, for reflection)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Point-in-circle test, boundary inclusive
#[inline]
pub fn circle_contains(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) <= radius * radius
}

/// Whether two circles touch or overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let reach = ra + rb;
    a.distance_squared(b) <= reach * reach
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Check a body against the inside walls of the world box
///
/// Corners report the combined normal of both walls.
pub fn world_wall_collision(pos: Vec2, radius: f32, world: Vec2) -> CollisionResult {
    let mut normal = Vec2::ZERO;
    let mut penetration: f32 = 0.0;

    if pos.x - radius < 0.0 {
        normal.x += 1.0;
        penetration = penetration.max(radius - pos.x);
    } else if pos.x + radius > world.x {
        normal.x -= 1.0;
        penetration = penetration.max(pos.x + radius - world.x);
    }
    if pos.y - radius < 0.0 {
        normal.y += 1.0;
        penetration = penetration.max(radius - pos.y);
    } else if pos.y + radius > world.y {
        normal.y -= 1.0;
        penetration = penetration.max(pos.y + radius - world.y);
    }

    if normal == Vec2::ZERO {
        return CollisionResult::miss();
    }
    CollisionResult {
        hit: true,
        normal: normal.normalize(),
        penetration,
    }
}

/// Whether a body has fully left the world box (plus a margin)
pub fn outside_world(pos: Vec2, margin: f32, world: Vec2) -> bool {
    pos.x < -margin || pos.y < -margin || pos.x > world.x + margin || pos.y > world.y + margin
}
