//! Game tuning table
//!
//! Every balance number the simulation reads lives here. Defaults reproduce
//! the reference feel; a JSON file can override any subset of fields.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};
use crate::error::GameError;

/// Inclusive speed range an enemy speed is rolled from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f32,
    pub max: f32,
}

impl SpeedRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &'static str) -> Result<(), GameError> {
        if !(self.min >= 0.0 && self.min <= self.max) {
            return Err(GameError::invalid(
                field,
                format!("need 0 <= min <= max, got {}..{}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Visible area and optional world bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewTuning {
    pub width: f32,
    pub height: f32,
    /// World size in pixels; `None` means the world is unbounded
    pub world_size: Option<Vec2>,
}

impl Default for ViewTuning {
    fn default() -> Self {
        Self {
            width: VIEW_WIDTH,
            height: VIEW_HEIGHT,
            world_size: None,
        }
    }
}

impl ViewTuning {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub radius: f32,
    pub speed: f32,
    pub health: i32,
    /// Health lost per enemy contact
    pub contact_damage: i32,
    pub trail_length: usize,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            radius: 15.0,
            speed: 200.0,
            health: 10,
            contact_damage: 1,
            trail_length: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingTuning {
    /// Seconds between shots before the archetype modifier
    pub base_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_radius: f32,
    pub projectile_damage: i32,
    /// Angle between the side shots and the centre shot of the spread archetype
    pub spread_degrees: f32,
    pub nova_count: u32,
}

impl Default for ShootingTuning {
    fn default() -> Self {
        Self {
            base_cooldown: 1.0,
            projectile_speed: 250.0,
            projectile_radius: 4.0,
            projectile_damage: 1,
            spread_degrees: 15.0,
            nova_count: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BouncingTuning {
    pub speed: f32,
    pub radius: f32,
    /// Seconds
    pub lifetime: f32,
    pub max_bounces: u32,
    /// Bounce off world edges instead of the view when a world size is set
    pub use_world_bounds: bool,
}

impl Default for BouncingTuning {
    fn default() -> Self {
        Self {
            speed: 220.0,
            radius: 10.0,
            lifetime: 7.0,
            max_bounces: 5,
            use_world_bounds: false,
        }
    }
}

/// Relative odds of each spawn kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnWeights {
    pub triangle: f32,
    pub square_group: f32,
    pub hexagon: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Seconds between spawn attempts
    pub interval: f32,
    pub max_enemies: usize,
    /// Distance outside the view edge where enemies appear
    pub edge_margin: f32,
    pub weights: SpawnWeights,
    pub square_group_min: u32,
    pub square_group_max: u32,
    /// Per-unit random offset (±) around the group's edge point
    pub square_jitter: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            interval: 1.5,
            max_enemies: 50,
            edge_margin: 30.0,
            weights: SpawnWeights {
                triangle: 0.40,
                square_group: 0.35,
                hexagon: 0.25,
            },
            square_group_min: 2,
            square_group_max: 4,
            square_jitter: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangleTuning {
    /// Tip to base centre
    pub height: f32,
    pub base_width: f32,
    pub speed: SpeedRange,
    pub health: i32,
}

impl Default for TriangleTuning {
    fn default() -> Self {
        Self {
            height: 20.0,
            base_width: 15.0,
            speed: SpeedRange::new(70.0, 110.0),
            health: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SquareTuning {
    pub size: f32,
    pub speed: SpeedRange,
    pub health: i32,
}

impl Default for SquareTuning {
    fn default() -> Self {
        Self {
            size: 18.0,
            speed: SpeedRange::new(60.0, 100.0),
            health: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HexagonTuning {
    /// Centre to vertex
    pub radius: f32,
    pub speed: SpeedRange,
    pub health: i32,
}

impl Default for HexagonTuning {
    fn default() -> Self {
        Self {
            radius: 22.0,
            speed: SpeedRange::new(50.0, 90.0),
            health: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub triangle: TriangleTuning,
    pub square: SquareTuning,
    pub hexagon: HexagonTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupTuning {
    /// Probability a kill drops the special pickup
    pub special_chance: f64,
    pub normal_value: u32,
    pub special_value: u32,
    /// Ellipse width x height
    pub normal_size: Vec2,
    pub special_size: Vec2,
}

impl Default for PickupTuning {
    fn default() -> Self {
        Self {
            special_chance: 0.15,
            normal_value: 1,
            special_value: 2,
            normal_size: Vec2::new(10.0, 20.0),
            special_size: Vec2::new(15.0, 22.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub initial_threshold: u32,
    /// next = floor(threshold * growth + bonus)
    pub threshold_growth: f32,
    pub threshold_bonus: f32,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            initial_threshold: 10,
            threshold_growth: 1.2,
            threshold_bonus: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreTuning {
    pub offer_size: usize,
    pub faster_shots_factor: f32,
    pub min_cooldown: f32,
    pub speed_factor: f32,
    pub health_factor: f32,
}

impl Default for StoreTuning {
    fn default() -> Self {
        Self {
            offer_size: 3,
            faster_shots_factor: 0.85,
            min_cooldown: 0.05,
            speed_factor: 1.15,
            health_factor: 1.20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoomerangTuning {
    pub cooldown: f32,
    pub speed: f32,
    /// Outbound distance before turning back
    pub range: f32,
    pub radius: f32,
    pub damage: i32,
    /// Seconds before the same enemy can be hit again
    pub hit_cooldown: f32,
    pub lifetime: f32,
}

impl Default for BoomerangTuning {
    fn default() -> Self {
        Self {
            cooldown: 2.0,
            speed: 320.0,
            range: 260.0,
            radius: 9.0,
            damage: 1,
            hit_cooldown: 0.5,
            lifetime: 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalTuning {
    pub distance: f32,
    /// Radians per second
    pub angular_speed: f32,
    pub radius: f32,
    pub damage: i32,
    pub hit_cooldown: f32,
}

impl Default for OrbitalTuning {
    fn default() -> Self {
        Self {
            distance: 60.0,
            angular_speed: 3.0,
            radius: 8.0,
            damage: 1,
            hit_cooldown: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundTuning {
    /// Cycle progress per second
    pub transition_speed: f32,
}

impl Default for BackgroundTuning {
    fn default() -> Self {
        Self {
            transition_speed: 0.02,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.1,
        }
    }
}

/// Complete tuning table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub view: ViewTuning,
    pub player: PlayerTuning,
    pub shooting: ShootingTuning,
    pub bouncing: BouncingTuning,
    pub spawn: SpawnTuning,
    pub enemies: EnemyTuning,
    pub pickups: PickupTuning,
    pub progression: ProgressionTuning,
    pub store: StoreTuning,
    pub boomerang: BoomerangTuning,
    pub orbital: OrbitalTuning,
    pub background: BackgroundTuning,
    pub audio: AudioSettings,
}

fn positive(field: &'static str, value: f32) -> Result<(), GameError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::invalid(field, format!("must be > 0, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), GameError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::invalid(field, format!("must be >= 0, got {value}")))
    }
}

fn unit_interval(field: &'static str, value: f32) -> Result<(), GameError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GameError::invalid(field, format!("must be in [0, 1], got {value}")))
    }
}

fn at_least(field: &'static str, value: f32, min: f32) -> Result<(), GameError> {
    if value >= min && value.is_finite() {
        Ok(())
    } else {
        Err(GameError::invalid(field, format!("must be >= {min}, got {value}")))
    }
}

fn at_least_one(field: &'static str, value: i32) -> Result<(), GameError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(GameError::invalid(field, format!("must be >= 1, got {value}")))
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning table and validate it
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: &Path) -> Result<Self, GameError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, GameError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default tuning");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), GameError> {
        positive("view.width", self.view.width)?;
        positive("view.height", self.view.height)?;
        if let Some(world) = self.view.world_size {
            let min = 2.0 * self.player.radius;
            if !(world.x > min && world.y > min) {
                return Err(GameError::invalid(
                    "view.world_size",
                    format!("must exceed the player diameter, got {world}"),
                ));
            }
        }

        positive("player.radius", self.player.radius)?;
        non_negative("player.speed", self.player.speed)?;
        at_least_one("player.health", self.player.health)?;
        at_least_one("player.contact_damage", self.player.contact_damage)?;

        positive("shooting.base_cooldown", self.shooting.base_cooldown)?;
        non_negative("shooting.projectile_speed", self.shooting.projectile_speed)?;
        positive("shooting.projectile_radius", self.shooting.projectile_radius)?;
        at_least_one("shooting.projectile_damage", self.shooting.projectile_damage)?;
        if self.shooting.nova_count == 0 {
            return Err(GameError::invalid("shooting.nova_count", "must be >= 1"));
        }

        non_negative("bouncing.speed", self.bouncing.speed)?;
        positive("bouncing.radius", self.bouncing.radius)?;
        positive("bouncing.lifetime", self.bouncing.lifetime)?;

        positive("spawn.interval", self.spawn.interval)?;
        non_negative("spawn.edge_margin", self.spawn.edge_margin)?;
        non_negative("spawn.square_jitter", self.spawn.square_jitter)?;
        let w = self.spawn.weights;
        non_negative("spawn.weights.triangle", w.triangle)?;
        non_negative("spawn.weights.square_group", w.square_group)?;
        non_negative("spawn.weights.hexagon", w.hexagon)?;
        if w.triangle + w.square_group + w.hexagon <= 0.0 {
            return Err(GameError::invalid("spawn.weights", "sum must be > 0"));
        }
        if self.spawn.square_group_min == 0
            || self.spawn.square_group_min > self.spawn.square_group_max
        {
            return Err(GameError::invalid(
                "spawn.square_group_min",
                format!(
                    "need 1 <= min <= max, got {}..{}",
                    self.spawn.square_group_min, self.spawn.square_group_max
                ),
            ));
        }

        let e = &self.enemies;
        positive("enemies.triangle.height", e.triangle.height)?;
        positive("enemies.triangle.base_width", e.triangle.base_width)?;
        e.triangle.speed.validate("enemies.triangle.speed")?;
        at_least_one("enemies.triangle.health", e.triangle.health)?;
        positive("enemies.square.size", e.square.size)?;
        e.square.speed.validate("enemies.square.speed")?;
        at_least_one("enemies.square.health", e.square.health)?;
        positive("enemies.hexagon.radius", e.hexagon.radius)?;
        e.hexagon.speed.validate("enemies.hexagon.speed")?;
        at_least_one("enemies.hexagon.health", e.hexagon.health)?;

        let p = &self.pickups;
        if !(0.0..=1.0).contains(&p.special_chance) {
            return Err(GameError::invalid(
                "pickups.special_chance",
                format!("must be in [0, 1], got {}", p.special_chance),
            ));
        }
        positive("pickups.normal_size.x", p.normal_size.x)?;
        positive("pickups.normal_size.y", p.normal_size.y)?;
        positive("pickups.special_size.x", p.special_size.x)?;
        positive("pickups.special_size.y", p.special_size.y)?;

        if self.progression.initial_threshold == 0 {
            return Err(GameError::invalid(
                "progression.initial_threshold",
                "must be >= 1",
            ));
        }
        if !(self.progression.threshold_growth >= 1.0) {
            return Err(GameError::invalid(
                "progression.threshold_growth",
                format!("must be >= 1, got {}", self.progression.threshold_growth),
            ));
        }
        non_negative("progression.threshold_bonus", self.progression.threshold_bonus)?;

        if self.store.offer_size == 0 {
            return Err(GameError::invalid("store.offer_size", "must be >= 1"));
        }
        let store = &self.store;
        if !(store.faster_shots_factor > 0.0 && store.faster_shots_factor <= 1.0) {
            return Err(GameError::invalid(
                "store.faster_shots_factor",
                format!("must be in (0, 1], got {}", store.faster_shots_factor),
            ));
        }
        positive("store.min_cooldown", store.min_cooldown)?;
        at_least("store.speed_factor", store.speed_factor, 1.0)?;
        at_least("store.health_factor", store.health_factor, 1.0)?;

        positive("boomerang.cooldown", self.boomerang.cooldown)?;
        non_negative("boomerang.speed", self.boomerang.speed)?;
        positive("boomerang.range", self.boomerang.range)?;
        positive("boomerang.radius", self.boomerang.radius)?;
        at_least_one("boomerang.damage", self.boomerang.damage)?;
        positive("boomerang.hit_cooldown", self.boomerang.hit_cooldown)?;
        positive("boomerang.lifetime", self.boomerang.lifetime)?;

        positive("orbital.distance", self.orbital.distance)?;
        positive("orbital.radius", self.orbital.radius)?;
        at_least_one("orbital.damage", self.orbital.damage)?;
        positive("orbital.hit_cooldown", self.orbital.hit_cooldown)?;

        non_negative("background.transition_speed", self.background.transition_speed)?;

        unit_interval("audio.master_volume", self.audio.master_volume)?;
        unit_interval("audio.sfx_volume", self.audio.sfx_volume)?;
        unit_interval("audio.music_volume", self.audio.music_volume)?;

        Ok(())
    }
}
