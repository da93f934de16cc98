//! Shape generation for 2D primitives

use glam::Vec2;

/// Triangle with its tip at `tip`, pointing toward `target`.
/// Falls back to pointing up when the two coincide.
pub fn triangle_points(tip: Vec2, target: Vec2, height: f32, base_width: f32) -> [Vec2; 3] {
    let dir = (target - tip).try_normalize().unwrap_or(Vec2::NEG_Y);
    let base_center = tip - dir * height;
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (base_width / 2.0);
    [tip, base_center + perp, base_center - perp]
}

/// Regular hexagon with a vertex straight up
pub fn hexagon_points(center: Vec2, radius: f32) -> [Vec2; 6] {
    std::array::from_fn(|i| {
        let theta = (60.0 * i as f32 - 90.0).to_radians();
        center + Vec2::new(radius * theta.cos(), radius * theta.sin())
    })
}

/// Top-left corner of an axis-aligned square centred on `center`
pub fn square_origin(center: Vec2, size: f32) -> Vec2 {
    center - Vec2::splat(size / 2.0)
}

/// One fading dot of a movement trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailDot {
    pub pos: Vec2,
    pub radius: f32,
    /// 0.0 - 1.0
    pub alpha: f32,
}

/// Fade alpha and size along a trail (newest first)
pub fn trail_dots(trail: &[Vec2], radius: f32) -> Vec<TrailDot> {
    let trail_len = trail.len() as f32;
    trail
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &pos)| {
            let t = i as f32 / trail_len;
            TrailDot {
                pos,
                radius: radius * (1.0 - t * 0.7),
                alpha: (1.0 - t) * 0.8,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_points_toward_target() {
        let [tip, left, right] = triangle_points(Vec2::ZERO, Vec2::new(100.0, 0.0), 20.0, 15.0);
        assert_eq!(tip, Vec2::ZERO);
        assert!((left - Vec2::new(-20.0, 7.5)).length() < 1e-4);
        assert!((right - Vec2::new(-20.0, -7.5)).length() < 1e-4);
    }

    #[test]
    fn test_triangle_on_target_points_up() {
        let [_, left, right] = triangle_points(Vec2::ZERO, Vec2::ZERO, 20.0, 15.0);
        assert!((left.y - 20.0).abs() < 1e-4);
        assert!((right.y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_hexagon_vertices() {
        let points = hexagon_points(Vec2::new(10.0, 10.0), 22.0);
        assert!((points[0] - Vec2::new(10.0, -12.0)).length() < 1e-4);
        for p in points {
            assert!((p.distance(Vec2::new(10.0, 10.0)) - 22.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_trail_fades() {
        let trail: Vec<Vec2> = (0..7).map(|i| Vec2::new(i as f32, 0.0)).collect();
        let dots = trail_dots(&trail, 15.0);
        assert_eq!(dots.len(), 6);
        for pair in dots.windows(2) {
            assert!(pair[1].alpha < pair[0].alpha);
            assert!(pair[1].radius < pair[0].radius);
        }
        assert!(trail_dots(&[], 15.0).is_empty());
    }
}
