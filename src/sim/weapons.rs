//! Primary fire, persistent weapons, and projectile flight

use glam::Vec2;

use super::collision::{bounce_inside_rect, outside_rect};
use super::state::{
    Archetype, BoomerangPhase, GameEvent, GameState, HitCooldowns, Projectile, ProjectileKind,
};
use crate::color::palette;
use crate::rotate_degrees;

/// Rectangle bouncing projectiles reflect inside of
pub fn bounce_bounds(state: &GameState) -> (Vec2, Vec2) {
    match state.tuning.view.world_size {
        Some(world) if state.tuning.bouncing.use_world_bounds => (Vec2::ZERO, world),
        _ => state.view_rect(),
    }
}

fn straight_shot(state: &mut GameState, dir: Vec2) -> Projectile {
    let shooting = &state.tuning.shooting;
    let (speed, radius, damage) = (
        shooting.projectile_speed,
        shooting.projectile_radius,
        shooting.projectile_damage,
    );
    let id = state.next_entity_id();
    Projectile::new(
        id,
        ProjectileKind::Straight,
        state.player.pos,
        dir,
        speed,
        radius,
        damage,
        palette::LIGHT_SKY_BLUE,
    )
}

fn bouncing_shot(state: &mut GameState, dir: Vec2) -> Projectile {
    let bouncing = state.tuning.bouncing.clone();
    let damage = state.tuning.shooting.projectile_damage;
    let id = state.next_entity_id();
    Projectile::new(
        id,
        ProjectileKind::Bouncing {
            bounces_left: bouncing.max_bounces,
        },
        state.player.pos,
        dir,
        bouncing.speed,
        bouncing.radius,
        damage,
        palette::FOREST_GREEN,
    )
    .with_lifetime(bouncing.lifetime)
}

/// Fire the archetype's pattern once. Returns false when nothing was fired
/// (no archetype, or no enemy to aim at for targeted patterns).
pub fn fire_primary(state: &mut GameState) -> bool {
    let Some(archetype) = state.archetype else {
        return false;
    };
    let aim = state
        .nearest_enemy(state.player.pos)
        .map(|enemy| enemy.pos - state.player.pos);
    if archetype.needs_target() && aim.is_none() {
        return false;
    }
    let aim = aim.unwrap_or(Vec2::X);

    let shots: Vec<Projectile> = match archetype {
        Archetype::Standard => vec![straight_shot(state, aim)],
        Archetype::Spread => {
            let spread = state.tuning.shooting.spread_degrees;
            [-spread, 0.0, spread]
                .into_iter()
                .map(|deg| straight_shot(state, rotate_degrees(aim, deg)))
                .collect()
        }
        Archetype::Nova => {
            let count = state.tuning.shooting.nova_count;
            let step = 360.0 / count as f32;
            (0..count)
                .map(|i| straight_shot(state, rotate_degrees(Vec2::X, step * i as f32)))
                .collect()
        }
        Archetype::Bouncer => vec![bouncing_shot(state, aim)],
    };

    log::debug!("{} fired {} projectile(s)", archetype.name(), shots.len());
    state.projectiles.extend(shots);
    state.events.push(GameEvent::Shot(archetype));
    true
}

/// Accumulate the shot timer and fire when the effective cooldown has
/// elapsed. A targeted archetype holds its shot until an enemy exists.
pub fn update_primary_fire(state: &mut GameState, dt: f32) -> bool {
    let Some(archetype) = state.archetype else {
        return false;
    };
    state.shot_timer += dt;
    let cooldown = state.player.shoot_cooldown * archetype.cooldown_modifier();
    if state.shot_timer >= cooldown && fire_primary(state) {
        state.shot_timer = 0.0;
        return true;
    }
    false
}

fn boomerang_in_flight(state: &GameState) -> bool {
    state
        .projectiles
        .iter()
        .any(|p| matches!(p.kind, ProjectileKind::Boomerang { .. }))
}

/// Throw the boomerang at the nearest enemy once its cooldown is up
pub fn update_boomerang_throw(state: &mut GameState, dt: f32) -> bool {
    if !state.weapons.boomerang {
        return false;
    }
    state.weapons.boomerang_timer += dt;

    let tuning = state.tuning.boomerang.clone();
    if state.weapons.boomerang_timer < tuning.cooldown || boomerang_in_flight(state) {
        return false;
    }
    let Some(target) = state.nearest_enemy(state.player.pos).map(|e| e.pos) else {
        return false;
    };

    let id = state.next_entity_id();
    let boomerang = Projectile::new(
        id,
        ProjectileKind::Boomerang {
            phase: BoomerangPhase::Outbound,
            traveled: 0.0,
            range: tuning.range,
            hits: HitCooldowns::default(),
        },
        state.player.pos,
        target - state.player.pos,
        tuning.speed,
        tuning.radius,
        tuning.damage,
        palette::CORAL,
    )
    .with_lifetime(tuning.lifetime);

    log::debug!("Boomerang #{id} thrown toward {target:?}");
    state.projectiles.push(boomerang);
    state.weapons.boomerang_timer = 0.0;
    state.events.push(GameEvent::BoomerangThrown);
    true
}

/// Move every projectile and drop the spent ones (expired, off-screen,
/// out of bounces, or caught boomerangs)
pub fn update_projectiles(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let catch_radius_sq = state.player.radius * state.player.radius;
    let (view_min, view_max) = state.view_rect();
    let (bounce_min, bounce_max) = bounce_bounds(state);

    for projectile in state.projectiles.iter_mut() {
        if let ProjectileKind::Boomerang {
            phase: BoomerangPhase::Returning,
            ..
        } = projectile.kind
        {
            if let Some(home) = (player_pos - projectile.pos).try_normalize() {
                projectile.dir = home;
            }
        }

        projectile.advance(dt);
        if projectile.is_expired() {
            projectile.alive = false;
            continue;
        }

        match &mut projectile.kind {
            ProjectileKind::Straight => {
                if outside_rect(projectile.pos, projectile.radius, view_min, view_max) {
                    projectile.alive = false;
                }
            }
            ProjectileKind::Bouncing { bounces_left } => {
                if let Some(dir) = bounce_inside_rect(
                    projectile.pos,
                    projectile.dir,
                    projectile.radius,
                    bounce_min,
                    bounce_max,
                ) {
                    if *bounces_left == 0 {
                        projectile.alive = false;
                    } else {
                        *bounces_left -= 1;
                        projectile.dir = dir;
                    }
                }
            }
            ProjectileKind::Boomerang {
                phase, traveled, range, ..
            } => match *phase {
                BoomerangPhase::Outbound if *traveled >= *range => {
                    *phase = BoomerangPhase::Returning;
                }
                BoomerangPhase::Returning
                    if projectile.pos.distance_squared(player_pos) < catch_radius_sq =>
                {
                    projectile.alive = false;
                }
                _ => {}
            },
        }
    }

    state.projectiles.retain(|p| p.alive);
}

/// Swing the orbital weapon around the player
pub fn update_orbital(state: &mut GameState, dt: f32) {
    let center = state.player.pos;
    let tuning = &state.tuning.orbital;
    if let Some(orbital) = state.weapons.orbital.as_mut() {
        orbital.update(center, tuning.distance, tuning.angular_speed, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::state::{Enemy, EnemyKind, OrbitalWeapon};

    fn playing_state(archetype: Archetype) -> GameState {
        let mut state = GameState::new(11, Tuning::default());
        state.start_run(archetype);
        state.drain_events();
        state
    }

    fn add_square(state: &mut GameState, pos: Vec2) {
        let id = state.next_entity_id();
        state
            .enemies
            .push(Enemy::new(id, EnemyKind::Square { size: 18.0 }, pos, 0.0, 2));
    }

    fn add_projectile(state: &mut GameState, kind: ProjectileKind, pos: Vec2, dir: Vec2) -> usize {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile::new(
            id,
            kind,
            pos,
            dir,
            220.0,
            10.0,
            1,
            palette::WHITE,
        ));
        state.projectiles.len() - 1
    }

    #[test]
    fn test_standard_aims_at_nearest() {
        let mut state = playing_state(Archetype::Standard);
        let player = state.player.pos;
        add_square(&mut state, player + Vec2::new(0.0, 300.0));
        add_square(&mut state, player + Vec2::new(100.0, 0.0));

        assert!(fire_primary(&mut state));
        assert_eq!(state.projectiles.len(), 1);
        assert!((state.projectiles[0].dir - Vec2::X).length() < 1e-6);
        assert_eq!(state.drain_events(), vec![GameEvent::Shot(Archetype::Standard)]);
    }

    #[test]
    fn test_targeted_archetype_waits_for_enemy() {
        let mut state = playing_state(Archetype::Standard);
        assert!(!update_primary_fire(&mut state, 2.0));
        assert!(state.projectiles.is_empty());
        assert_eq!(state.shot_timer, 2.0);

        // Fires on the first tick an enemy exists
        let pos = state.player.pos + Vec2::new(50.0, 0.0);
        add_square(&mut state, pos);
        assert!(update_primary_fire(&mut state, 0.01));
        assert_eq!(state.shot_timer, 0.0);
    }

    #[test]
    fn test_cooldown_modifier_delays_spread() {
        let mut state = playing_state(Archetype::Spread);
        let pos = state.player.pos + Vec2::new(50.0, 0.0);
        add_square(&mut state, pos);
        assert!(!update_primary_fire(&mut state, 1.1));
        assert!(update_primary_fire(&mut state, 0.1));
        assert_eq!(state.projectiles.len(), 3);

        let angles: Vec<f32> = state
            .projectiles
            .iter()
            .map(|p| p.dir.y.atan2(p.dir.x).to_degrees())
            .collect();
        assert!((angles[0] + 15.0).abs() < 1e-3);
        assert!(angles[1].abs() < 1e-3);
        assert!((angles[2] - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_nova_fires_without_target() {
        let mut state = playing_state(Archetype::Nova);
        assert!(fire_primary(&mut state));
        assert_eq!(state.projectiles.len(), 8);
        assert!((state.projectiles[0].dir - Vec2::X).length() < 1e-6);
        let diagonal = Vec2::new(1.0, 1.0).normalize();
        assert!((state.projectiles[1].dir - diagonal).length() < 1e-5);
    }

    #[test]
    fn test_bouncer_fires_bouncing_shot() {
        let mut state = playing_state(Archetype::Bouncer);
        let pos = state.player.pos + Vec2::new(-80.0, 0.0);
        add_square(&mut state, pos);
        assert!(fire_primary(&mut state));
        let shot = &state.projectiles[0];
        assert!(matches!(shot.kind, ProjectileKind::Bouncing { bounces_left: 5 }));
        assert_eq!(shot.lifetime, Some(7.0));
        assert_eq!(shot.color, palette::FOREST_GREEN);
    }

    #[test]
    fn test_straight_shot_leaves_view() {
        let mut state = playing_state(Archetype::Standard);
        add_projectile(&mut state, ProjectileKind::Straight, Vec2::new(1295.0, 360.0), Vec2::X);
        add_projectile(&mut state, ProjectileKind::Straight, Vec2::new(640.0, 360.0), Vec2::X);
        update_projectiles(&mut state, 1.0 / 60.0);
        assert_eq!(state.projectiles.len(), 1);
        assert!(state.projectiles[0].pos.x < 700.0);
    }

    #[test]
    fn test_bouncing_shot_spends_budget_on_edges() {
        let mut state = playing_state(Archetype::Bouncer);
        let idx = add_projectile(
            &mut state,
            ProjectileKind::Bouncing { bounces_left: 5 },
            Vec2::new(1275.0, 360.0),
            Vec2::X,
        );
        update_projectiles(&mut state, 1.0 / 60.0);
        let shot = &state.projectiles[idx];
        assert_eq!(shot.dir, Vec2::NEG_X);
        assert!(matches!(shot.kind, ProjectileKind::Bouncing { bounces_left: 4 }));
    }

    #[test]
    fn test_bouncing_shot_without_budget_is_destroyed() {
        let mut state = playing_state(Archetype::Bouncer);
        add_projectile(
            &mut state,
            ProjectileKind::Bouncing { bounces_left: 0 },
            Vec2::new(1275.0, 360.0),
            Vec2::X,
        );
        update_projectiles(&mut state, 1.0 / 60.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_expired_projectile_removed_same_tick() {
        let mut state = playing_state(Archetype::Bouncer);
        let idx = add_projectile(
            &mut state,
            ProjectileKind::Bouncing { bounces_left: 5 },
            Vec2::new(640.0, 100.0),
            Vec2::X,
        );
        state.projectiles[idx].lifetime = Some(0.5);
        update_projectiles(&mut state, 0.25);
        assert_eq!(state.projectiles.len(), 1);
        update_projectiles(&mut state, 0.25);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_boomerang_round_trip() {
        let mut state = playing_state(Archetype::Standard);
        state.weapons.boomerang = true;
        let pos = state.player.pos + Vec2::new(400.0, 0.0);
        add_square(&mut state, pos);

        assert!(!update_boomerang_throw(&mut state, 1.0));
        assert!(update_boomerang_throw(&mut state, 1.0));
        assert_eq!(state.drain_events(), vec![GameEvent::BoomerangThrown]);
        // Only one in flight
        assert!(!update_boomerang_throw(&mut state, 5.0));

        // 260px out at 320px/s turns around after ~0.81s
        for _ in 0..50 {
            update_projectiles(&mut state, 1.0 / 60.0);
        }
        match &state.projectiles[0].kind {
            ProjectileKind::Boomerang { phase, .. } => {
                assert_eq!(*phase, BoomerangPhase::Returning)
            }
            other => panic!("unexpected {other:?}"),
        }

        for _ in 0..60 {
            update_projectiles(&mut state, 1.0 / 60.0);
        }
        assert!(state.projectiles.is_empty(), "boomerang should be caught");
    }

    #[test]
    fn test_orbital_circles_player() {
        let mut state = playing_state(Archetype::Standard);
        state.weapons.orbital = Some(OrbitalWeapon::default());
        update_orbital(&mut state, 0.5);
        let orbital = state.weapons.orbital.as_ref().unwrap();
        assert!((orbital.angle - 1.5).abs() < 1e-5);
        assert!((orbital.pos.distance(state.player.pos) - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_world_bounds_for_bouncing() {
        let mut tuning = Tuning::default();
        tuning.view.world_size = Some(Vec2::new(3000.0, 3000.0));
        tuning.bouncing.use_world_bounds = true;
        let state = GameState::new(1, tuning);
        assert_eq!(bounce_bounds(&state), (Vec2::ZERO, Vec2::new(3000.0, 3000.0)));
    }
}
