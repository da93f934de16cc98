//! Per-frame simulation step
//!
//! Drives the phase machine and, while playing, runs every subsystem in a
//! fixed order so a seed plus an input sequence always replays the same run.

use glam::Vec2;

use super::collision::separate_enemies;
use super::state::{Archetype, GameEvent, GamePhase, GameState};
use super::{combat, spawn, store, weapons};
use crate::consts::MAX_FRAME_DT;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (any length; normalized before use)
    pub move_axis: Vec2,
    /// Archetype picked on the character select screen
    pub select_archetype: Option<Archetype>,
    /// Store offer index to buy
    pub purchase: Option<usize>,
    /// Leave the store without buying
    pub cancel: bool,
    /// Start a new run after game over
    pub restart: bool,
    pub quit: bool,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    };

    // Background keeps cycling behind every screen
    let transition_speed = state.tuning.background.transition_speed;
    state.background.advance(transition_speed, dt);

    if input.quit {
        log::info!("Quit requested during {:?}", state.phase);
        state.events.push(GameEvent::QuitRequested);
        return;
    }

    match state.phase {
        GamePhase::CharacterSelect => {
            if let Some(archetype) = input.select_archetype {
                state.events.push(GameEvent::ArchetypeSelected(archetype));
                state.start_run(archetype);
            }
        }
        GamePhase::Playing => step_playing(state, input, dt),
        GamePhase::StorePaused => {
            if let Some(index) = input.purchase {
                store::purchase(state, index);
            } else if input.cancel {
                store::close_store(state);
            }
        }
        GamePhase::GameOver => {
            if let (true, Some(archetype)) = (input.restart, state.archetype) {
                state.start_run(archetype);
            }
        }
    }

    #[cfg(debug_assertions)]
    check_invariants(state);
}

#[cfg(debug_assertions)]
fn check_invariants(state: &GameState) {
    if let Err(err) = state.validate_invariants() {
        log::error!("{err}");
        panic!("state invariant broken after tick: {err}");
    }
}

/// Move the player, clamp to the world, follow with the camera
fn move_player(state: &mut GameState, axis: Vec2, dt: f32) {
    let player = &mut state.player;
    if let Some(dir) = axis.try_normalize() {
        player.pos += dir * player.speed * dt;
    }
    if let Some(world) = state.tuning.view.world_size {
        let r = Vec2::splat(player.radius);
        player.pos = player.pos.clamp(r, world - r);
    }
    player.record_trail(state.tuning.player.trail_length);
    state.update_camera();
}

/// One frame of active gameplay
fn step_playing(state: &mut GameState, input: &TickInput, dt: f32) {
    state.elapsed += dt;

    move_player(state, input.move_axis, dt);

    weapons::update_primary_fire(state, dt);
    weapons::update_boomerang_throw(state, dt);
    spawn::update_spawner(state, dt);

    weapons::update_projectiles(state, dt);
    weapons::update_orbital(state, dt);

    let target = state.player.pos;
    for enemy in state.enemies.iter_mut() {
        enemy.seek(target, dt);
    }
    separate_enemies(&mut state.enemies, &mut state.rng);

    combat::resolve_projectile_hits(state);
    combat::collect_pickups(state);

    // The store may have opened on this frame's pickups
    if state.phase == GamePhase::Playing {
        combat::resolve_player_contact(state);
    }
}
