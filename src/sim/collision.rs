//! Collision detection and response
//!
//! Everything here is radius based: circles against circles, circles against
//! axis-aligned boxes, plus the reflection math used by bouncing shots.

use glam::Vec2;
use rand::Rng;

use super::state::Enemy;

/// Strict circle overlap test (touching circles do not collide)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Circle against an axis-aligned box given by centre and half extents
pub fn circle_aabb_overlap(
    center: Vec2,
    radius: f32,
    box_center: Vec2,
    half_extents: Vec2,
) -> bool {
    let closest = center.clamp(box_center - half_extents, box_center + half_extents);
    center.distance_squared(closest) < radius * radius
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Unit normal of a circular body at `center`, pointing toward `point`.
/// Falls back to `-incoming` when the two coincide.
pub fn surface_normal(center: Vec2, point: Vec2, incoming: Vec2) -> Vec2 {
    (point - center)
        .try_normalize()
        .or_else(|| (-incoming).try_normalize())
        .unwrap_or(Vec2::Y)
}

/// Bounce a unit direction off the inside of a rectangle.
///
/// Returns the new direction when the circle touches a wall it is moving
/// into, `None` otherwise. Both axes can flip in a corner.
pub fn bounce_inside_rect(pos: Vec2, dir: Vec2, radius: f32, min: Vec2, max: Vec2) -> Option<Vec2> {
    let mut out = dir;
    let mut bounced = false;

    if (pos.x - radius <= min.x && dir.x < 0.0) || (pos.x + radius >= max.x && dir.x > 0.0) {
        out = reflect_velocity(out, Vec2::X);
        bounced = true;
    }
    if (pos.y - radius <= min.y && dir.y < 0.0) || (pos.y + radius >= max.y && dir.y > 0.0) {
        out = reflect_velocity(out, Vec2::Y);
        bounced = true;
    }

    bounced.then_some(out)
}

/// Whether a circle has fully left a rectangle
pub fn outside_rect(pos: Vec2, radius: f32, min: Vec2, max: Vec2) -> bool {
    pos.x < min.x - radius
        || pos.x > max.x + radius
        || pos.y < min.y - radius
        || pos.y > max.y + radius
}

/// Push overlapping enemies apart (cosmetic anti-stacking pass).
///
/// Each overlapping pair moves by half the overlap along the line between
/// them; pairs on the exact same spot get a small random nudge.
/// Returns the number of pairs adjusted.
pub fn separate_enemies<R: Rng>(enemies: &mut [Enemy], rng: &mut R) -> usize {
    let mut adjusted = 0;
    for j in 1..enemies.len() {
        let (head, tail) = enemies.split_at_mut(j);
        let second = &mut tail[0];
        for first in head.iter_mut() {
            let delta = first.pos - second.pos;
            let dist_sq = delta.length_squared();
            let total = first.kind.collision_radius() + second.kind.collision_radius();

            if dist_sq == 0.0 {
                let nudge = Vec2::new(rng.random_range(-1.0..=1.0), rng.random_range(-1.0..=1.0))
                    .try_normalize()
                    .unwrap_or(Vec2::X)
                    * 0.1;
                first.pos += nudge;
                second.pos -= nudge;
                adjusted += 1;
            } else if dist_sq < total * total {
                let distance = dist_sq.sqrt();
                let push = delta / distance * ((total - distance) / 2.0);
                first.pos += push;
                second.pos -= push;
                adjusted += 1;
            }
        }
    }
    adjusted
}
