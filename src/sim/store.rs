//! Upgrade store
//!
//! When the pickup bar fills, a few upgrades are sampled from the master list.
//! Buying one applies its effect exactly once and closes the store.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState, OrbitalWeapon};

/// Permanent upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    FasterShots,
    PlayerSpeed,
    MaxHealth,
    Boomerang,
    Orbital,
}

impl Upgrade {
    /// Master list, in display order
    pub const ALL: [Upgrade; 5] = [
        Upgrade::FasterShots,
        Upgrade::PlayerSpeed,
        Upgrade::MaxHealth,
        Upgrade::Boomerang,
        Upgrade::Orbital,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Upgrade::FasterShots => "faster_shots",
            Upgrade::PlayerSpeed => "player_speed",
            Upgrade::MaxHealth => "max_health",
            Upgrade::Boomerang => "boomerang",
            Upgrade::Orbital => "orbital",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Upgrade::FasterShots => "Faster Shots",
            Upgrade::PlayerSpeed => "Player Speed+",
            Upgrade::MaxHealth => "Max Health+",
            Upgrade::Boomerang => "Boomerang",
            Upgrade::Orbital => "Orbital Guard",
        }
    }

    /// Weapons can only be bought once per run
    pub fn is_eligible(&self, state: &GameState) -> bool {
        match self {
            Upgrade::Boomerang => !state.weapons.boomerang,
            Upgrade::Orbital => state.weapons.orbital.is_none(),
            _ => true,
        }
    }

    /// Apply the effect to the current run
    pub fn apply(&self, state: &mut GameState) {
        let store = &state.tuning.store;
        let player = &mut state.player;
        match self {
            Upgrade::FasterShots => {
                player.shoot_cooldown =
                    (player.shoot_cooldown * store.faster_shots_factor).max(store.min_cooldown);
                log::info!("Faster shots: cooldown now {:.2}s", player.shoot_cooldown);
            }
            Upgrade::PlayerSpeed => {
                player.speed = (player.speed * store.speed_factor).floor();
                log::info!("Player speed now {:.0}", player.speed);
            }
            Upgrade::MaxHealth => {
                let grown = (player.max_health as f32 * store.health_factor) as i32;
                player.max_health = grown.max(1);
                player.health = player.max_health;
                log::info!("Max health now {}", player.max_health);
            }
            Upgrade::Boomerang => {
                state.weapons.boomerang = true;
                state.weapons.boomerang_timer = 0.0;
                log::info!("Boomerang acquired");
            }
            Upgrade::Orbital => {
                let mut orbital = OrbitalWeapon::default();
                orbital.update(state.player.pos, state.tuning.orbital.distance, 0.0, 0.0);
                state.weapons.orbital = Some(orbital);
                log::info!("Orbital guard acquired");
            }
        }
    }
}

/// Sample up to `offer_size` distinct eligible upgrades
pub fn generate_offer(state: &mut GameState) -> Vec<Upgrade> {
    let eligible: Vec<Upgrade> = Upgrade::ALL
        .iter()
        .copied()
        .filter(|u| u.is_eligible(state))
        .collect();
    let count = state.tuning.store.offer_size.min(eligible.len());
    eligible
        .choose_multiple(&mut state.rng, count)
        .copied()
        .collect()
}

/// Fill the bar: bump the level, raise the next threshold, open the store
pub fn open_store(state: &mut GameState) {
    let growth = &state.tuning.progression;
    let progression = &mut state.progression;
    progression.collected = 0;
    progression.level += 1;
    progression.threshold =
        (progression.threshold as f32 * growth.threshold_growth + growth.threshold_bonus) as u32;

    state.store_offer = generate_offer(state);
    state.phase = GamePhase::StorePaused;
    state.events.push(GameEvent::StoreOpened {
        level: state.progression.level,
    });
    log::info!(
        "Store opened at level {} (next bar: {}), offering {:?}",
        state.progression.level,
        state.progression.threshold,
        state.store_offer.iter().map(Upgrade::id).collect::<Vec<_>>()
    );
}

/// Buy the offer at `index`. Returns false (and changes nothing) for an
/// invalid index or when the store is not open.
pub fn purchase(state: &mut GameState, index: usize) -> bool {
    if state.phase != GamePhase::StorePaused {
        return false;
    }
    let Some(&upgrade) = state.store_offer.get(index) else {
        log::warn!(
            "Ignoring purchase of offer {index}: only {} on offer",
            state.store_offer.len()
        );
        return false;
    };

    upgrade.apply(state);
    state.store_offer.clear();
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::UpgradePurchased(upgrade));
    true
}

/// Leave the store without buying
pub fn close_store(state: &mut GameState) {
    if state.phase != GamePhase::StorePaused {
        return;
    }
    state.store_offer.clear();
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::StoreClosed);
    log::info!("Store closed without purchase");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::state::Archetype;
    use std::collections::HashSet;

    fn playing_state() -> GameState {
        let mut state = GameState::new(42, Tuning::default());
        state.start_run(Archetype::Standard);
        state
    }

    #[test]
    fn test_offer_is_distinct_and_bounded() {
        let mut state = playing_state();
        for _ in 0..50 {
            let offer = generate_offer(&mut state);
            assert_eq!(offer.len(), 3);
            let unique: HashSet<_> = offer.iter().collect();
            assert_eq!(unique.len(), offer.len());
        }
    }

    #[test]
    fn test_owned_weapons_leave_the_pool() {
        let mut state = playing_state();
        state.weapons.boomerang = true;
        state.weapons.orbital = Some(OrbitalWeapon::default());
        state.tuning.store.offer_size = 5;
        let offer = generate_offer(&mut state);
        assert_eq!(offer.len(), 3);
        assert!(!offer.contains(&Upgrade::Boomerang));
        assert!(!offer.contains(&Upgrade::Orbital));
    }

    #[test]
    fn test_open_store_raises_threshold() {
        let mut state = playing_state();
        state.progression.collected = 10;
        open_store(&mut state);
        assert_eq!(state.phase, GamePhase::StorePaused);
        assert_eq!(state.progression.collected, 0);
        assert_eq!(state.progression.level, 2);
        assert_eq!(state.progression.threshold, 13);
        assert!(!state.store_offer.is_empty());
        state.validate_invariants().unwrap();
    }

    #[test]
    fn test_purchase_applies_once_and_clears() {
        let mut state = playing_state();
        state.phase = GamePhase::StorePaused;
        state.store_offer = vec![Upgrade::FasterShots, Upgrade::MaxHealth];

        assert!(purchase(&mut state, 0));
        assert!((state.player.shoot_cooldown - 0.85).abs() < 1e-6);
        assert!(state.store_offer.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);

        // A repeated click finds the store closed
        assert!(!purchase(&mut state, 0));
        assert!((state.player.shoot_cooldown - 0.85).abs() < 1e-6);
        assert_eq!(
            state
                .drain_events()
                .iter()
                .filter(|e| matches!(e, GameEvent::UpgradePurchased(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_purchase_out_of_range_is_ignored() {
        let mut state = playing_state();
        state.phase = GamePhase::StorePaused;
        state.store_offer = vec![Upgrade::PlayerSpeed];
        assert!(!purchase(&mut state, 3));
        assert_eq!(state.phase, GamePhase::StorePaused);
        assert_eq!(state.player.speed, 200.0);
    }

    #[test]
    fn test_upgrade_effects() {
        let mut state = playing_state();
        Upgrade::PlayerSpeed.apply(&mut state);
        assert_eq!(state.player.speed, (200.0_f32 * 1.15).floor());

        state.player.health = 4;
        Upgrade::MaxHealth.apply(&mut state);
        assert_eq!(state.player.max_health, 12);
        assert_eq!(state.player.health, 12);

        state.player.shoot_cooldown = 0.055;
        Upgrade::FasterShots.apply(&mut state);
        assert_eq!(state.player.shoot_cooldown, 0.05);

        Upgrade::Orbital.apply(&mut state);
        let orbital = state.weapons.orbital.as_ref().unwrap();
        assert!((orbital.pos.distance(state.player.pos) - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_max_health_never_drops_to_zero() {
        let mut state = playing_state();
        state.tuning.store.health_factor = 0.5;
        state.player.max_health = 1;
        Upgrade::MaxHealth.apply(&mut state);
        assert_eq!(state.player.max_health, 1);
        assert_eq!(state.player.health, 1);
    }

    #[test]
    fn test_close_store_without_effect() {
        let mut state = playing_state();
        state.phase = GamePhase::StorePaused;
        state.store_offer = vec![Upgrade::MaxHealth];
        close_store(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.max_health, 10);
        assert!(state.store_offer.is_empty());
    }
}
