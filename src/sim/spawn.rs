//! Timed enemy spawner
//!
//! Every `spawn.interval` seconds (while under the population cap) pick a view
//! edge, a point just beyond it, and a weighted enemy kind.

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::state::{Enemy, EnemyKind, EntityId, GameState};
use crate::settings::{SpawnWeights, SpeedRange};

/// View edge an enemy group enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
        SpawnEdge::Right,
    ];
}

/// What a single spawn roll produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Triangle,
    SquareGroup,
    Hexagon,
}

impl SpawnKind {
    const ORDER: [SpawnKind; 3] = [SpawnKind::Triangle, SpawnKind::SquareGroup, SpawnKind::Hexagon];
}

/// Uniform in [lo, hi), or the midpoint when the span is empty
fn span<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if lo < hi {
        rng.random_range(lo..hi)
    } else {
        (lo + hi) / 2.0
    }
}

/// A world position `margin` beyond `edge` of the view at `camera`.
/// The along-edge coordinate keeps `2 * margin` clear of the corners.
pub fn edge_point<R: Rng>(
    rng: &mut R,
    edge: SpawnEdge,
    camera: Vec2,
    view: Vec2,
    margin: f32,
) -> Vec2 {
    match edge {
        SpawnEdge::Top => Vec2::new(
            camera.x + span(rng, margin * 2.0, view.x - margin * 2.0),
            camera.y - margin,
        ),
        SpawnEdge::Bottom => Vec2::new(
            camera.x + span(rng, margin * 2.0, view.x - margin * 2.0),
            camera.y + view.y + margin,
        ),
        SpawnEdge::Left => Vec2::new(
            camera.x - margin,
            camera.y + span(rng, margin * 2.0, view.y - margin * 2.0),
        ),
        SpawnEdge::Right => Vec2::new(
            camera.x + view.x + margin,
            camera.y + span(rng, margin * 2.0, view.y - margin * 2.0),
        ),
    }
}

/// Weighted choice between the spawn kinds
pub fn roll_kind<R: Rng>(rng: &mut R, weights: &SpawnWeights) -> SpawnKind {
    match WeightedIndex::new([weights.triangle, weights.square_group, weights.hexagon]) {
        Ok(dist) => SpawnKind::ORDER[dist.sample(rng)],
        Err(e) => {
            log::warn!("Bad spawn weights ({e}), defaulting to triangle");
            SpawnKind::Triangle
        }
    }
}

fn roll_speed<R: Rng>(rng: &mut R, range: SpeedRange) -> f32 {
    rng.random_range(range.min..=range.max)
}

/// Create one enemy of `kind` at `pos` (square groups spawn their units
/// through this one at a time)
pub fn make_enemy(state: &mut GameState, kind: SpawnKind, pos: Vec2) -> Enemy {
    let id: EntityId = state.next_entity_id();
    let tuning = &state.tuning.enemies;
    match kind {
        SpawnKind::Triangle => {
            let t = &tuning.triangle;
            let speed = roll_speed(&mut state.rng, t.speed);
            Enemy::new(
                id,
                EnemyKind::Triangle {
                    height: t.height,
                    base_width: t.base_width,
                },
                pos,
                speed,
                t.health,
            )
        }
        SpawnKind::SquareGroup => {
            let s = &tuning.square;
            let speed = roll_speed(&mut state.rng, s.speed);
            Enemy::new(id, EnemyKind::Square { size: s.size }, pos, speed, s.health)
        }
        SpawnKind::Hexagon => {
            let h = &tuning.hexagon;
            let speed = roll_speed(&mut state.rng, h.speed);
            Enemy::new(id, EnemyKind::Hexagon { radius: h.radius }, pos, speed, h.health)
        }
    }
}

/// Spawn one roll's worth of enemies at a random view edge.
/// Units that would exceed the cap are skipped. Returns how many spawned.
pub fn spawn_group(state: &mut GameState) -> usize {
    let edge = SpawnEdge::ALL[state.rng.random_range(0..SpawnEdge::ALL.len())];
    let view = state.tuning.view.size();
    let margin = state.tuning.spawn.edge_margin;
    let anchor = edge_point(&mut state.rng, edge, state.camera, view, margin);
    let kind = roll_kind(&mut state.rng, &state.tuning.spawn.weights);
    let cap = state.tuning.spawn.max_enemies;

    let positions: Vec<Vec2> = match kind {
        SpawnKind::SquareGroup => {
            let spawn = &state.tuning.spawn;
            let (min, max) = (spawn.square_group_min, spawn.square_group_max);
            let jitter = spawn.square_jitter;
            let count = state.rng.random_range(min..=max);
            (0..count)
                .map(|_| {
                    anchor
                        + Vec2::new(
                            state.rng.random_range(-jitter..=jitter),
                            state.rng.random_range(-jitter..=jitter),
                        )
                })
                .collect()
        }
        _ => vec![anchor],
    };

    let mut spawned = 0;
    for pos in positions {
        if state.enemies.len() >= cap {
            break;
        }
        let enemy = make_enemy(state, kind, pos);
        log::debug!("Spawned {} #{} at {:?} ({:?} edge)", enemy.kind.name(), enemy.id, pos, edge);
        state.enemies.push(enemy);
        spawned += 1;
    }
    spawned
}

/// Advance the spawn timer and spawn when due. The timer keeps running while
/// the population is capped, so the next free slot fills immediately.
pub fn update_spawner(state: &mut GameState, dt: f32) -> usize {
    state.spawn_timer += dt;
    if state.spawn_timer >= state.tuning.spawn.interval
        && state.enemies.len() < state.tuning.spawn.max_enemies
    {
        state.spawn_timer = 0.0;
        return spawn_group(state);
    }
    0
}
