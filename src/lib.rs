//! Swarm Survivor - A top-down survival shooter
//!
//! Core modules:
//! - `sim`: Seeded simulation (spawning, movement, collisions, progression)
//! - `renderer`: Draw-command generation for a presentation layer
//! - `audio`: Sound signals with graceful degradation
//! - `settings`: Data-driven game balance
//! - `autopilot`: Demo controller that plays the game

pub mod audio;
pub mod autopilot;
pub mod color;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use color::Color;
pub use error::GameError;
pub use settings::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Target frame rate of the reference loop
    pub const FPS: u32 = 60;
    /// Frame timestep used by the headless driver
    pub const FRAME_DT: f32 = 1.0 / FPS as f32;
    /// Largest delta-time a single tick will integrate (prevents tunneling after stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Default view dimensions (pixels)
    pub const VIEW_WIDTH: f32 = 1280.0;
    pub const VIEW_HEIGHT: f32 = 720.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Rotate a vector by `degrees` (counter-clockwise in math orientation)
#[inline]
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}

/// Format seconds as MM:SS
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-4);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_degrees() {
        let v = rotate_degrees(Vec2::X, 90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(65.9), "01:05");
        assert_eq!(format_clock(-3.0), "00:00");
    }
}
