//! Collision and combat resolution
//!
//! Entity lists are scanned in insertion order and the first match wins.
//! Destroyed entities are only flagged during a pass and compacted at the end,
//! so no list is mutated while it is being iterated.

use glam::Vec2;
use rand::Rng;

use super::collision::{circle_aabb_overlap, circles_overlap, reflect_velocity, surface_normal};
use super::state::{Enemy, EntityId, GameEvent, GamePhase, GameState, Pickup, ProjectileKind};
use super::store::open_store;
use crate::color::palette;

/// Live enemy whose hit circle overlaps the given circle
fn in_reach(pos: Vec2, radius: f32, enemy: &Enemy) -> bool {
    enemy.is_alive() && circles_overlap(pos, radius, enemy.pos, enemy.kind.hit_radius())
}

/// Damage one enemy and report the outcome
fn hit_enemy(
    enemy: &mut Enemy,
    damage: i32,
    events: &mut Vec<GameEvent>,
    killed: &mut Vec<(EntityId, Vec2)>,
) {
    if enemy.take_damage(damage) {
        events.push(GameEvent::EnemyKilled {
            id: enemy.id,
            pos: enemy.pos,
        });
        killed.push((enemy.id, enemy.pos));
    } else {
        events.push(GameEvent::EnemyDamaged {
            id: enemy.id,
            health: enemy.health,
        });
    }
}

/// Leave a pickup where an enemy died
pub fn drop_pickup(state: &mut GameState, pos: Vec2) {
    let tuning = &state.tuning.pickups;
    let special = state.rng.random_bool(tuning.special_chance);
    let (size, color, value) = if special {
        (tuning.special_size, palette::PINK, tuning.special_value)
    } else {
        (tuning.normal_size, palette::GOLD, tuning.normal_value)
    };
    let id = state.next_entity_id();
    state.pickups.push(Pickup {
        id,
        pos,
        size,
        color,
        value,
        special,
    });
}

/// Resolve projectiles and the orbital weapon against enemies.
///
/// Straight shots are spent on their first hit. Bouncing shots reflect off
/// the enemy's surface while bounces remain. Boomerang and orbital hits are
/// rate limited per target. Returns the number of enemies destroyed.
pub fn resolve_projectile_hits(state: &mut GameState) -> usize {
    let now = state.elapsed;
    let boomerang_cooldown = state.tuning.boomerang.hit_cooldown;
    let mut killed = Vec::new();

    {
        let enemies = &mut state.enemies;
        let events = &mut state.events;

        for projectile in state.projectiles.iter_mut().filter(|p| p.alive) {
            match &mut projectile.kind {
                ProjectileKind::Straight => {
                    let target = enemies
                        .iter_mut()
                        .find(|e| in_reach(projectile.pos, projectile.radius, e));
                    if let Some(enemy) = target {
                        hit_enemy(enemy, projectile.damage, events, &mut killed);
                        projectile.alive = false;
                    }
                }
                ProjectileKind::Bouncing { bounces_left } => {
                    let target = enemies
                        .iter_mut()
                        .find(|e| in_reach(projectile.pos, projectile.radius, e));
                    let Some(enemy) = target else { continue };
                    let normal = surface_normal(enemy.pos, projectile.pos, projectile.dir);
                    // Already moving out of this enemy
                    if projectile.dir.dot(normal) >= 0.0 {
                        continue;
                    }
                    hit_enemy(enemy, projectile.damage, events, &mut killed);
                    if *bounces_left == 0 {
                        projectile.alive = false;
                    } else {
                        *bounces_left -= 1;
                        projectile.dir = reflect_velocity(projectile.dir, normal);
                        let clearance = enemy.kind.hit_radius() + projectile.radius;
                        projectile.pos = enemy.pos + normal * clearance;
                    }
                }
                ProjectileKind::Boomerang { hits, .. } => {
                    for enemy in enemies.iter_mut() {
                        if in_reach(projectile.pos, projectile.radius, enemy)
                            && hits.ready(enemy.id, now, boomerang_cooldown)
                        {
                            hits.record(enemy.id, now);
                            hit_enemy(enemy, projectile.damage, events, &mut killed);
                        }
                    }
                }
            }
        }

        let orbital_tuning = &state.tuning.orbital;
        if let Some(orbital) = state.weapons.orbital.as_mut() {
            for enemy in enemies.iter_mut() {
                if in_reach(orbital.pos, orbital_tuning.radius, enemy)
                    && orbital.hits.ready(enemy.id, now, orbital_tuning.hit_cooldown)
                {
                    orbital.hits.record(enemy.id, now);
                    hit_enemy(enemy, orbital_tuning.damage, events, &mut killed);
                }
            }
        }
    }

    for &(id, pos) in &killed {
        log::debug!("Enemy #{id} destroyed at {pos:?}");
        drop_pickup(state, pos);
        state.kill_count += 1;
    }

    state.enemies.retain(Enemy::is_alive);
    state.projectiles.retain(|p| p.alive);
    prune_hit_cooldowns(state);
    killed.len()
}

/// Forget cooldown entries for enemies that no longer exist
pub fn prune_hit_cooldowns(state: &mut GameState) {
    let enemies = &state.enemies;
    let exists = |id: EntityId| enemies.iter().any(|e| e.id == id);
    for projectile in state.projectiles.iter_mut() {
        if let ProjectileKind::Boomerang { hits, .. } = &mut projectile.kind {
            hits.retain(exists);
        }
    }
    if let Some(orbital) = state.weapons.orbital.as_mut() {
        orbital.hits.retain(exists);
    }
}

/// Pick up everything the player touches. Value past the threshold is
/// discarded; crossing it opens the store and leaves the rest on the ground.
pub fn collect_pickups(state: &mut GameState) -> u32 {
    let mut gained = 0;
    let mut i = 0;
    while i < state.pickups.len() {
        let pickup = &state.pickups[i];
        let player = &state.player;
        if !circle_aabb_overlap(player.pos, player.radius, pickup.pos, pickup.size / 2.0) {
            i += 1;
            continue;
        }

        let pickup = state.pickups.remove(i);
        let progression = &mut state.progression;
        progression.collected = (progression.collected + pickup.value).min(progression.threshold);
        gained += pickup.value;
        state.events.push(GameEvent::PickupCollected { value: pickup.value });

        if state.progression.collected >= state.progression.threshold {
            open_store(state);
            break;
        }
    }
    gained
}

/// Handle the player touching enemies. Every overlapping enemy, in list
/// order, costs `contact_damage` and is destroyed without a drop; the pass
/// stops once the player dies. Returns the number of enemies touched.
pub fn resolve_player_contact(state: &mut GameState) -> usize {
    let damage = state.tuning.player.contact_damage;
    let (pos, radius) = (state.player.pos, state.player.radius);
    let mut touched = 0;

    for enemy in state.enemies.iter_mut() {
        if !circles_overlap(pos, radius, enemy.pos, enemy.kind.contact_radius()) {
            continue;
        }
        enemy.health = 0;
        touched += 1;
        state.kill_count += 1;

        if state.player.take_damage(damage) {
            state.phase = GamePhase::GameOver;
            state.store_offer.clear();
            state.events.push(GameEvent::PlayerDied);
            log::info!(
                "Player destroyed by {} after {} ({} kills, level {})",
                enemy.kind.name(),
                crate::format_clock(state.elapsed),
                state.kill_count,
                state.progression.level
            );
            break;
        }
        state.events.push(GameEvent::PlayerHit {
            health: state.player.health,
        });
        log::debug!("Player hit by {}, health {}", enemy.kind.name(), state.player.health);
    }

    if touched > 0 {
        state.enemies.retain(Enemy::is_alive);
        prune_hit_cooldowns(state);
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::state::{Archetype, EnemyKind, OrbitalWeapon, Projectile};

    fn playing_state() -> GameState {
        let mut state = GameState::new(99, Tuning::default());
        state.start_run(Archetype::Standard);
        state.drain_events();
        state
    }

    fn add_enemy(state: &mut GameState, kind: EnemyKind, health: i32, pos: Vec2) -> EntityId {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, kind, pos, 0.0, health));
        id
    }

    fn add_projectile(state: &mut GameState, kind: ProjectileKind, pos: Vec2, dir: Vec2) {
        let id = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new(id, kind, pos, dir, 250.0, 4.0, 1, palette::LIGHT_SKY_BLUE));
    }

    fn add_pickup(state: &mut GameState, pos: Vec2, value: u32) {
        let id = state.next_entity_id();
        state.pickups.push(Pickup {
            id,
            pos,
            size: Vec2::new(10.0, 20.0),
            color: palette::GOLD,
            value,
            special: false,
        });
    }

    const FAR: Vec2 = Vec2::new(100.0, 100.0);

    #[test]
    fn test_square_takes_two_hits() {
        let mut state = playing_state();
        add_enemy(&mut state, EnemyKind::Square { size: 18.0 }, 2, FAR);

        add_projectile(&mut state, ProjectileKind::Straight, FAR, Vec2::X);
        assert_eq!(resolve_projectile_hits(&mut state), 0);
        assert_eq!(state.enemies[0].health, 1);
        assert!(state.pickups.is_empty());
        assert!(state.projectiles.is_empty());

        add_projectile(&mut state, ProjectileKind::Straight, FAR, Vec2::X);
        assert_eq!(resolve_projectile_hits(&mut state), 1);
        assert!(state.enemies.is_empty());
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(state.pickups[0].pos, FAR);
        assert_eq!(state.kill_count, 1);
    }

    #[test]
    fn test_straight_shot_hits_first_listed_enemy_only() {
        let mut state = playing_state();
        let first = add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, FAR);
        add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, FAR + Vec2::new(5.0, 0.0));
        add_projectile(&mut state, ProjectileKind::Straight, FAR, Vec2::X);
        resolve_projectile_hits(&mut state);
        assert_eq!(state.enemies[0].health, 2);
        assert_eq!(state.enemies[1].health, 3);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::EnemyDamaged { id: first, health: 2 }]
        );
    }

    #[test]
    fn test_bouncing_shot_reflects_off_enemy() {
        let mut state = playing_state();
        add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, FAR);
        add_projectile(
            &mut state,
            ProjectileKind::Bouncing { bounces_left: 5 },
            FAR - Vec2::new(20.0, 0.0),
            Vec2::X,
        );
        resolve_projectile_hits(&mut state);

        assert_eq!(state.enemies[0].health, 2);
        let shot = &state.projectiles[0];
        assert!((shot.dir - Vec2::NEG_X).length() < 1e-6);
        assert!(matches!(shot.kind, ProjectileKind::Bouncing { bounces_left: 4 }));
        assert!((shot.pos.distance(FAR) - 26.0).abs() < 1e-4);

        // Pushed clear, so the same enemy is not hit again next pass
        resolve_projectile_hits(&mut state);
        assert_eq!(state.enemies[0].health, 2);
    }

    #[test]
    fn test_bouncing_shot_out_of_bounces_is_destroyed() {
        let mut state = playing_state();
        add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, FAR);
        add_projectile(
            &mut state,
            ProjectileKind::Bouncing { bounces_left: 0 },
            FAR - Vec2::new(20.0, 0.0),
            Vec2::X,
        );
        resolve_projectile_hits(&mut state);
        assert_eq!(state.enemies[0].health, 2);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_boomerang_hit_cooldown() {
        let mut state = playing_state();
        add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, FAR);
        add_projectile(
            &mut state,
            ProjectileKind::Boomerang {
                phase: crate::sim::state::BoomerangPhase::Outbound,
                traveled: 0.0,
                range: 260.0,
                hits: Default::default(),
            },
            FAR,
            Vec2::X,
        );

        state.elapsed = 1.0;
        resolve_projectile_hits(&mut state);
        resolve_projectile_hits(&mut state);
        assert_eq!(state.enemies[0].health, 2);
        assert_eq!(state.projectiles.len(), 1);

        state.elapsed = 1.5;
        resolve_projectile_hits(&mut state);
        assert_eq!(state.enemies[0].health, 1);
    }

    #[test]
    fn test_orbital_hits_and_prunes() {
        let mut state = playing_state();
        add_enemy(&mut state, EnemyKind::Triangle { height: 20.0, base_width: 15.0 }, 1, FAR);
        let beside = FAR + Vec2::new(10.0, 0.0);
        let survivor = add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, beside);
        state.weapons.orbital = Some(OrbitalWeapon {
            angle: 0.0,
            pos: FAR,
            hits: Default::default(),
        });

        state.elapsed = 2.0;
        assert_eq!(resolve_projectile_hits(&mut state), 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].health, 2);

        let orbital = state.weapons.orbital.as_ref().unwrap();
        assert_eq!(orbital.hits.len(), 1);
        assert!(!orbital.hits.ready(survivor, 2.1, 0.5));
    }

    #[test]
    fn test_special_pickup_drop() {
        let mut state = playing_state();
        state.tuning.pickups.special_chance = 1.0;
        drop_pickup(&mut state, FAR);
        let pickup = &state.pickups[0];
        assert!(pickup.special);
        assert_eq!(pickup.value, 2);
        assert_eq!(pickup.color, palette::PINK);
    }

    #[test]
    fn test_threshold_opens_store_once() {
        let mut state = playing_state();
        let at = state.player.pos;
        for _ in 0..5 {
            add_pickup(&mut state, at, 2);
        }
        add_pickup(&mut state, at, 1);

        assert_eq!(collect_pickups(&mut state), 10);
        assert_eq!(state.phase, GamePhase::StorePaused);
        assert_eq!(state.progression.collected, 0);
        assert_eq!(state.progression.threshold, 13);
        assert_eq!(state.store_offer.len(), 3);
        // The leftover pickup waits for the next frame
        assert_eq!(state.pickups.len(), 1);
        let opened = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::StoreOpened { .. }))
            .count();
        assert_eq!(opened, 1);
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_excess_value_is_discarded() {
        let mut state = playing_state();
        state.progression.collected = 9;
        let at = state.player.pos;
        add_pickup(&mut state, at, 2);
        collect_pickups(&mut state);
        assert_eq!(state.phase, GamePhase::StorePaused);
        assert_eq!(state.progression.collected, 0);
    }

    #[test]
    fn test_distant_pickup_stays() {
        let mut state = playing_state();
        let at = state.player.pos + Vec2::new(40.0, 0.0);
        add_pickup(&mut state, at, 1);
        assert_eq!(collect_pickups(&mut state), 0);
        assert_eq!(state.pickups.len(), 1);
    }

    #[test]
    fn test_contact_costs_one_health() {
        let mut state = playing_state();
        let at = state.player.pos;
        add_enemy(&mut state, EnemyKind::Square { size: 18.0 }, 2, at);
        add_enemy(&mut state, EnemyKind::Square { size: 18.0 }, 2, FAR);

        assert_eq!(resolve_player_contact(&mut state), 1);
        assert_eq!(state.player.health, 9);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.kill_count, 1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.pickups.is_empty());
        assert_eq!(state.drain_events(), vec![GameEvent::PlayerHit { health: 9 }]);
    }

    #[test]
    fn test_every_touching_enemy_hurts() {
        let mut state = playing_state();
        let at = state.player.pos;
        for _ in 0..3 {
            add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, at);
        }

        assert_eq!(resolve_player_contact(&mut state), 3);
        assert_eq!(state.player.health, 7);
        assert!(state.enemies.is_empty());
        assert_eq!(state.kill_count, 3);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::PlayerHit { health: 9 },
                GameEvent::PlayerHit { health: 8 },
                GameEvent::PlayerHit { health: 7 },
            ]
        );
    }

    #[test]
    fn test_contact_stops_at_death() {
        let mut state = playing_state();
        state.player.health = 2;
        let at = state.player.pos;
        for _ in 0..4 {
            add_enemy(&mut state, EnemyKind::Square { size: 18.0 }, 2, at);
        }

        assert_eq!(resolve_player_contact(&mut state), 2);
        assert_eq!(state.player.health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.enemies.len(), 2);
        assert_eq!(state.kill_count, 2);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PlayerHit { health: 1 }, GameEvent::PlayerDied]
        );
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_last_health_ends_run() {
        let mut state = playing_state();
        state.player.health = 1;
        let at = state.player.pos + Vec2::new(10.0, 0.0);
        add_enemy(&mut state, EnemyKind::Hexagon { radius: 22.0 }, 3, at);

        assert_eq!(resolve_player_contact(&mut state), 1);
        assert_eq!(state.player.health, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.drain_events(), vec![GameEvent::PlayerDied]);
        state.validate_invariants().unwrap();
    }
}
