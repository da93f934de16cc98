//! Demo controller that plays the game
//!
//! Produces a [`TickInput`] from the current state: flee whatever is close,
//! otherwise go grab the nearest pickup, buy the first upgrade on offer.

use glam::Vec2;

use crate::sim::state::{Archetype, GamePhase, GameState};
use crate::sim::tick::TickInput;

/// Enemies closer than this are treated as threats
pub const DEFAULT_THREAT_RADIUS: f32 = 150.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    pub archetype: Archetype,
    pub threat_radius: f32,
    /// Start a new run after dying
    pub auto_restart: bool,
}

impl Autopilot {
    pub fn new(archetype: Archetype) -> Self {
        Self {
            archetype,
            threat_radius: DEFAULT_THREAT_RADIUS,
            auto_restart: true,
        }
    }

    /// Decide this frame's input
    pub fn input(&self, state: &GameState) -> TickInput {
        match state.phase {
            GamePhase::CharacterSelect => TickInput {
                select_archetype: Some(self.archetype),
                ..Default::default()
            },
            GamePhase::StorePaused => TickInput {
                purchase: Some(0),
                ..Default::default()
            },
            GamePhase::GameOver => TickInput {
                restart: self.auto_restart,
                ..Default::default()
            },
            GamePhase::Playing => TickInput {
                move_axis: self.steer(state),
                ..Default::default()
            },
        }
    }

    fn steer(&self, state: &GameState) -> Vec2 {
        let pos = state.player.pos;

        // Sum of pushes away from every nearby enemy, stronger when closer
        let flee: Vec2 = state
            .enemies
            .iter()
            .filter_map(|e| {
                let away = pos - e.pos;
                let dist = away.length();
                (dist < self.threat_radius).then(|| {
                    away.try_normalize().unwrap_or(Vec2::X) * (1.0 - dist / self.threat_radius)
                })
            })
            .sum();
        if flee != Vec2::ZERO {
            return flee;
        }

        // Safe, so go get the nearest pickup
        let nearest_pickup = state.pickups.iter().min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(pickup) = nearest_pickup {
            return pickup.pos - pos;
        }

        // Nothing to do: wander in a slow circle so spawns come from everywhere
        Vec2::from_angle(state.elapsed * 0.5) * 0.5
    }
}
