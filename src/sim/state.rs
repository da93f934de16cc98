//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`]; entity lists keep insertion
//! order and every entity carries a stable id that is never reused.

use std::collections::HashMap;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::store::Upgrade;
use crate::color::{Color, palette};
use crate::error::GameError;
use crate::settings::Tuning;

/// Stable entity handle, issued once per spawned entity
pub type EntityId = u32;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for an archetype choice
    CharacterSelect,
    /// Active gameplay
    Playing,
    /// Upgrade store is open, gameplay suspended
    StorePaused,
    /// Player died; only restart or quit
    GameOver,
}

/// Player weapon/visual choice, fixed for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Standard,
    Spread,
    Nova,
    Bouncer,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Standard,
        Archetype::Spread,
        Archetype::Nova,
        Archetype::Bouncer,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Archetype::Standard => "standard",
            Archetype::Spread => "triple_shot",
            Archetype::Nova => "nova_burst",
            Archetype::Bouncer => "bouncing_shot",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Archetype::Standard => "Standard",
            Archetype::Spread => "Spread",
            Archetype::Nova => "Burst",
            Archetype::Bouncer => "Bouncer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Archetype::Standard => "Single shot",
            Archetype::Spread => "Three-way spread",
            Archetype::Nova => "Eight-way burst",
            Archetype::Bouncer => "Ricocheting shot",
        }
    }

    pub fn from_id(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Some(Archetype::Standard),
            "triple_shot" | "spread" | "triple" => Some(Archetype::Spread),
            "nova_burst" | "nova" | "burst" => Some(Archetype::Nova),
            "bouncing_shot" | "bouncer" | "bouncing" => Some(Archetype::Bouncer),
            _ => None,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Archetype::Standard => palette::CRIMSON,
            Archetype::Spread => palette::MEDIUM_PURPLE,
            Archetype::Nova => palette::TEAL,
            Archetype::Bouncer => palette::FOREST_GREEN,
        }
    }

    /// Multiplier applied to the player's shoot cooldown
    pub fn cooldown_modifier(&self) -> f32 {
        match self {
            Archetype::Standard => 1.0,
            Archetype::Spread => 1.15,
            Archetype::Nova => 1.6,
            Archetype::Bouncer => 1.3,
        }
    }

    /// Whether firing requires at least one enemy to aim at
    pub fn needs_target(&self) -> bool {
        !matches!(self, Archetype::Nova)
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    /// Pixels per second
    pub speed: f32,
    /// Seconds between shots before the archetype modifier
    pub shoot_cooldown: f32,
    /// Recent positions for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            radius: tuning.player.radius,
            health: tuning.player.health,
            max_health: tuning.player.health,
            speed: tuning.player.speed,
            shoot_cooldown: tuning.shooting.base_cooldown,
            trail: Vec::with_capacity(tuning.player.trail_length),
        }
    }

    /// Record current position to trail
    pub fn record_trail(&mut self, max_len: usize) {
        self.trail.insert(0, self.pos);
        self.trail.truncate(max_len);
    }

    /// Apply damage, clamping at zero. Returns true if the player died.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.health = (self.health - amount).max(0);
        self.health == 0
    }
}

/// Enemy shape with its kind-specific dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// `pos` is the tip
    Triangle { height: f32, base_width: f32 },
    /// `pos` is the centre
    Square { size: f32 },
    /// `pos` is the centre; `radius` is centre to vertex
    Hexagon { radius: f32 },
}

impl EnemyKind {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Triangle { .. } => "triangle",
            EnemyKind::Square { .. } => "square",
            EnemyKind::Hexagon { .. } => "hexagon",
        }
    }

    /// Radius used to keep enemies from stacking
    pub fn collision_radius(&self) -> f32 {
        match *self {
            EnemyKind::Triangle { height, .. } => height * 0.75,
            EnemyKind::Square { size } => size * 0.75,
            EnemyKind::Hexagon { radius } => radius,
        }
    }

    /// Radius projectiles and weapons test against
    pub fn hit_radius(&self) -> f32 {
        match *self {
            EnemyKind::Triangle { height, .. } => height * 0.5,
            EnemyKind::Square { size } => size * std::f32::consts::FRAC_1_SQRT_2,
            EnemyKind::Hexagon { radius } => radius,
        }
    }

    /// Radius the player body tests against
    pub fn contact_radius(&self) -> f32 {
        match *self {
            EnemyKind::Triangle { height, .. } => height * 0.4,
            EnemyKind::Square { size } => size * 0.5,
            EnemyKind::Hexagon { radius } => radius * 0.85,
        }
    }

    pub fn base_color(&self) -> Color {
        match self {
            EnemyKind::Triangle { .. } => palette::OLIVE_DRAB,
            EnemyKind::Square { .. } => palette::STEEL_BLUE,
            EnemyKind::Hexagon { .. } => palette::ORANGE_RED,
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub speed: f32,
    pub health: i32,
    pub max_health: i32,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, pos: Vec2, speed: f32, health: i32) -> Self {
        Self {
            id,
            kind,
            pos,
            speed,
            health,
            max_health: health,
        }
    }

    /// Move toward `target` at full speed; no movement when already on it
    pub fn seek(&mut self, target: Vec2, dt: f32) {
        let to_target = target - self.pos;
        if to_target.length_squared() > 0.0 {
            self.pos += to_target.normalize() * self.speed * dt;
        }
    }

    /// Apply damage, clamping at zero. Returns true if this hit destroyed it.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        debug_assert!(self.health > 0, "damaging destroyed enemy {}", self.id);
        self.health = (self.health - amount).max(0);
        self.health == 0
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_damaged(&self) -> bool {
        self.health < self.max_health
    }

    pub fn color(&self) -> Color {
        if self.is_damaged() {
            palette::GREY
        } else {
            self.kind.base_color()
        }
    }
}

/// Last-hit timestamps per enemy, so persistent weapons hit each target at
/// most once per cooldown window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HitCooldowns {
    last_hit: HashMap<EntityId, f32>,
}

impl HitCooldowns {
    /// Whether `id` may be hit at time `now`
    pub fn ready(&self, id: EntityId, now: f32, cooldown: f32) -> bool {
        self.last_hit
            .get(&id)
            .is_none_or(|&last| now - last >= cooldown)
    }

    pub fn record(&mut self, id: EntityId, now: f32) {
        self.last_hit.insert(id, now);
    }

    /// Drop entries for enemies that no longer exist
    pub fn retain(&mut self, mut alive: impl FnMut(EntityId) -> bool) {
        self.last_hit.retain(|&id, _| alive(id));
    }

    pub fn len(&self) -> usize {
        self.last_hit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_hit.is_empty()
    }
}

/// Boomerang flight leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoomerangPhase {
    Outbound,
    Returning,
}

/// Projectile behaviour variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Destroyed on first hit or when it leaves the view
    Straight,
    /// Reflects off edges and enemies while bounces remain
    Bouncing { bounces_left: u32 },
    /// Flies out `range`, then homes back to the player
    Boomerang {
        phase: BoomerangPhase,
        traveled: f32,
        range: f32,
        hits: HitCooldowns,
    },
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    /// Unit direction
    pub dir: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub color: Color,
    pub damage: i32,
    /// Seconds since launch
    pub age: f32,
    pub lifetime: Option<f32>,
    /// Cleared when the projectile is spent; removed at the end of the pass
    pub alive: bool,
}

impl Projectile {
    /// Build a projectile flying from `pos` along `dir` (normalized here;
    /// zero direction falls back to straight up)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        kind: ProjectileKind,
        pos: Vec2,
        dir: Vec2,
        speed: f32,
        radius: f32,
        damage: i32,
        color: Color,
    ) -> Self {
        let dir = dir.try_normalize().unwrap_or(Vec2::NEG_Y);
        Self {
            id,
            kind,
            pos,
            dir,
            speed,
            radius,
            color,
            damage,
            age: 0.0,
            lifetime: None,
            alive: true,
        }
    }

    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    /// Integrate position and age
    pub fn advance(&mut self, dt: f32) {
        let step = self.speed * dt;
        self.pos += self.dir * step;
        self.age += dt;
        if let ProjectileKind::Boomerang { traveled, .. } = &mut self.kind {
            *traveled += step;
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime.is_some_and(|lifetime| self.age >= lifetime)
    }
}

/// Currency drop left by destroyed enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub pos: Vec2,
    /// Visual ellipse width x height (also the collection box)
    pub size: Vec2,
    pub color: Color,
    pub value: u32,
    pub special: bool,
}

/// Weapon that circles the player at a fixed distance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrbitalWeapon {
    /// Radians, wrapped to [-π, π)
    pub angle: f32,
    pub pos: Vec2,
    pub hits: HitCooldowns,
}

impl OrbitalWeapon {
    /// Advance the angle and place the weapon around `center`
    pub fn update(&mut self, center: Vec2, distance: f32, angular_speed: f32, dt: f32) {
        self.angle = crate::normalize_angle(self.angle + angular_speed * dt);
        self.pos = center + crate::polar_to_cartesian(distance, self.angle);
    }
}

/// Weapons bought from the store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weapons {
    pub boomerang: bool,
    /// Seconds since the last throw
    pub boomerang_timer: f32,
    pub orbital: Option<OrbitalWeapon>,
}

/// Pickup bar and level counter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    /// Value collected toward the current threshold
    pub collected: u32,
    pub threshold: u32,
    pub level: u32,
}

impl Progression {
    pub fn new(threshold: u32) -> Self {
        Self {
            collected: 0,
            threshold,
            level: 1,
        }
    }

    /// Bar fill in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.threshold == 0 {
            return 0.0;
        }
        (self.collected as f32 / self.threshold as f32).min(1.0)
    }
}

/// Slowly cycling background colour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundCycle {
    pub current: usize,
    pub next: usize,
    pub progress: f32,
}

impl Default for BackgroundCycle {
    fn default() -> Self {
        Self {
            current: 0,
            next: 1,
            progress: 0.0,
        }
    }
}

impl BackgroundCycle {
    pub fn advance(&mut self, speed: f32, dt: f32) {
        self.progress += speed * dt;
        if self.progress >= 1.0 {
            self.progress = 0.0;
            self.current = self.next;
            self.next = (self.next + 1) % palette::BG_CYCLE.len();
        }
    }

    pub fn color(&self) -> Color {
        let from = palette::BG_CYCLE[self.current % palette::BG_CYCLE.len()];
        let to = palette::BG_CYCLE[self.next % palette::BG_CYCLE.len()];
        from.lerp(to, self.progress)
    }
}

/// Fire-and-forget notifications for audio and the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ArchetypeSelected(Archetype),
    RunStarted,
    Shot(Archetype),
    BoomerangThrown,
    EnemyDamaged { id: EntityId, health: i32 },
    EnemyKilled { id: EntityId, pos: Vec2 },
    PickupCollected { value: u32 },
    PlayerHit { health: i32 },
    PlayerDied,
    StoreOpened { level: u32 },
    UpgradePurchased(Upgrade),
    StoreClosed,
    QuitRequested,
}

/// Complete game state (seeded, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Chosen once per run; `None` only during character select
    pub archetype: Option<Archetype>,
    pub player: Player,
    /// World position of the view's top-left corner
    pub camera: Vec2,
    /// Active enemies (insertion order)
    pub enemies: Vec<Enemy>,
    /// Active projectiles (insertion order)
    pub projectiles: Vec<Projectile>,
    /// Pickups lying on the ground
    pub pickups: Vec<Pickup>,
    pub weapons: Weapons,
    pub progression: Progression,
    /// Upgrades on offer while the store is open
    pub store_offer: Vec<Upgrade>,
    /// Seconds of active play this run
    pub elapsed: f32,
    pub kill_count: u32,
    /// Seconds since the last primary shot
    pub shot_timer: f32,
    /// Seconds since the last spawn
    pub spawn_timer: f32,
    pub background: BackgroundCycle,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: EntityId,
}

impl GameState {
    /// Create a new game state waiting for an archetype choice.
    ///
    /// `tuning` is trusted as is; use [`GameState::try_new`] for tables that
    /// have not been through [`Tuning::validate`].
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let start = Self::start_position(&tuning);
        let player = Player::new(start, &tuning);
        let progression = Progression::new(tuning.progression.initial_threshold);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::CharacterSelect,
            archetype: None,
            player,
            camera: Vec2::ZERO,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            weapons: Weapons::default(),
            progression,
            store_offer: Vec::new(),
            elapsed: 0.0,
            kill_count: 0,
            shot_timer: 0.0,
            spawn_timer: 0.0,
            background: BackgroundCycle::default(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        };
        state.update_camera();
        state
    }

    /// Validate `tuning`, then create the state
    pub fn try_new(seed: u64, tuning: Tuning) -> Result<Self, GameError> {
        tuning.validate()?;
        Ok(Self::new(seed, tuning))
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// World centre when bounded, otherwise the view centre
    fn start_position(tuning: &Tuning) -> Vec2 {
        match tuning.view.world_size {
            Some(world) => world / 2.0,
            None => tuning.view.size() / 2.0,
        }
    }

    /// Reset all run-scoped state and begin playing with `archetype`
    pub fn start_run(&mut self, archetype: Archetype) {
        let start = Self::start_position(&self.tuning);
        self.archetype = Some(archetype);
        self.player = Player::new(start, &self.tuning);
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.weapons = Weapons::default();
        self.progression = Progression::new(self.tuning.progression.initial_threshold);
        self.store_offer.clear();
        self.elapsed = 0.0;
        self.kill_count = 0;
        self.shot_timer = 0.0;
        self.spawn_timer = 0.0;
        self.phase = GamePhase::Playing;
        self.update_camera();
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started as {}", archetype.name());
    }

    /// Keep the player centred in the view
    pub fn update_camera(&mut self) {
        self.camera = self.player.pos - self.tuning.view.size() / 2.0;
    }

    /// View rectangle in world coordinates as (min, max)
    pub fn view_rect(&self) -> (Vec2, Vec2) {
        (self.camera, self.camera + self.tuning.view.size())
    }

    /// Closest living enemy to `pos` (first wins on ties)
    pub fn nearest_enemy(&self, pos: Vec2) -> Option<&Enemy> {
        self.enemies
            .iter()
            .filter(|e| e.is_alive())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(pos)
                    .partial_cmp(&b.pos.distance_squared(pos))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Take all events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check the invariants that must hold between ticks
    pub fn validate_invariants(&self) -> Result<(), GameError> {
        let violation = |msg: String| Err(GameError::StateViolation(msg));

        if self.player.health < 0 || self.player.health > self.player.max_health {
            return violation(format!(
                "player health {} outside 0..={}",
                self.player.health, self.player.max_health
            ));
        }
        if (self.phase == GamePhase::CharacterSelect) != self.archetype.is_none() {
            return violation(format!(
                "archetype {:?} inconsistent with phase {:?}",
                self.archetype, self.phase
            ));
        }
        if (self.phase == GamePhase::StorePaused) != !self.store_offer.is_empty() {
            return violation(format!(
                "{} store offers during {:?}",
                self.store_offer.len(),
                self.phase
            ));
        }
        if self.phase == GamePhase::GameOver && self.player.health > 0 {
            return violation("game over with positive health".into());
        }
        if self.phase == GamePhase::Playing && self.player.health == 0 {
            return violation("playing with zero health".into());
        }
        if self.phase == GamePhase::Playing
            && self.progression.collected >= self.progression.threshold
        {
            return violation(format!(
                "bar {} reached threshold {} without opening the store",
                self.progression.collected, self.progression.threshold
            ));
        }
        for enemy in &self.enemies {
            if !enemy.is_alive() {
                return violation(format!("destroyed enemy {} still listed", enemy.id));
            }
            if enemy.kind.collision_radius() <= 0.0 {
                return violation(format!("enemy {} has non-positive radius", enemy.id));
            }
        }
        for projectile in &self.projectiles {
            if !projectile.alive || projectile.is_expired() {
                return violation(format!("spent projectile {} still listed", projectile.id));
            }
            if projectile.radius <= 0.0 {
                return violation(format!("projectile {} has non-positive radius", projectile.id));
            }
        }
        Ok(())
    }
}
