//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep, clamped per tick
//! - Seeded RNG only
//! - Stable iteration order (insertion order, stable entity IDs)
//! - No rendering or audio dependencies; side effects leave as [`GameEvent`]s

pub mod collision;
pub mod combat;
pub mod spawn;
pub mod state;
pub mod store;
pub mod tick;
pub mod weapons;

pub use collision::{circles_overlap, reflect_velocity, separate_enemies};
pub use state::{
    Archetype, BoomerangPhase, Enemy, EnemyKind, EntityId, GameEvent, GamePhase, GameState,
    HitCooldowns, OrbitalWeapon, Pickup, Player, Projectile, ProjectileKind,
};
pub use store::Upgrade;
pub use tick::{TickInput, tick};
