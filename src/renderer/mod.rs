//! Draw-command generation
//!
//! Turns a [`GameState`] into a flat list of screen-space primitives plus a
//! HUD snapshot. The core never touches pixels; a presentation layer replays
//! the commands in order.

pub mod shapes;

use glam::Vec2;
use serde::Serialize;

use crate::color::{Color, palette};
use crate::sim::state::{Archetype, EnemyKind, GamePhase, GameState};

/// Extra screen margin kept when culling off-screen entities
const CULL_MARGIN: f32 = 50.0;

/// A single screen-space draw call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Fill the whole view
    Clear(Color),
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    /// Axis-aligned ellipse, `size` is width x height
    Ellipse {
        center: Vec2,
        size: Vec2,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
    },
    /// Axis-aligned rectangle from its top-left corner
    Rect {
        origin: Vec2,
        size: Vec2,
        color: Color,
    },
}

/// Text and gauges the UI layer overlays on the frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub archetype: Option<&'static str>,
    pub health: i32,
    pub max_health: i32,
    /// Pickup bar fill in [0, 1]
    pub bar_fraction: f32,
    pub level: u32,
    pub kills: u32,
    /// Run time as MM:SS
    pub clock: String,
    /// Store offer labels, in offer order
    pub offer: Vec<&'static str>,
    /// Archetype names and blurbs, only on the select screen
    pub choices: Vec<(&'static str, &'static str)>,
}

/// Everything needed to present one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    pub hud: Hud,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// World to screen transform for one frame
struct View {
    camera: Vec2,
    size: Vec2,
}

impl View {
    fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.camera
    }

    fn visible(&self, world: Vec2, radius: f32) -> bool {
        let p = self.to_screen(world);
        let pad = radius + CULL_MARGIN;
        p.x >= -pad && p.y >= -pad && p.x <= self.size.x + pad && p.y <= self.size.y + pad
    }
}

fn enemy_command(kind: &EnemyKind, pos: Vec2, player: Vec2, color: Color) -> DrawCommand {
    match *kind {
        EnemyKind::Triangle { height, base_width } => DrawCommand::Polygon {
            points: shapes::triangle_points(pos, player, height, base_width).to_vec(),
            color,
        },
        EnemyKind::Square { size } => DrawCommand::Rect {
            origin: shapes::square_origin(pos, size),
            size: Vec2::splat(size),
            color,
        },
        EnemyKind::Hexagon { radius } => DrawCommand::Polygon {
            points: shapes::hexagon_points(pos, radius).to_vec(),
            color,
        },
    }
}

/// Build the HUD snapshot
pub fn build_hud(state: &GameState) -> Hud {
    Hud {
        phase: state.phase,
        archetype: state.archetype.map(|a| a.name()),
        health: state.player.health,
        max_health: state.player.max_health,
        bar_fraction: state.progression.fraction(),
        level: state.progression.level,
        kills: state.kill_count,
        clock: crate::format_clock(state.elapsed),
        offer: state.store_offer.iter().map(|u| u.label()).collect(),
        choices: if state.phase == GamePhase::CharacterSelect {
            Archetype::ALL.iter().map(|a| (a.name(), a.description())).collect()
        } else {
            Vec::new()
        },
    }
}

/// Build the draw list for the current state.
///
/// Order: background, pickups, player trail, projectiles, enemies, orbital,
/// player. Nothing but the background is drawn during character select.
pub fn build_frame(state: &GameState) -> Frame {
    let view = View {
        camera: state.camera,
        size: state.tuning.view.size(),
    };
    let mut commands = vec![DrawCommand::Clear(state.background.color())];

    if state.phase != GamePhase::CharacterSelect {
        for pickup in state.pickups.iter().filter(|p| view.visible(p.pos, p.size.max_element())) {
            commands.push(DrawCommand::Ellipse {
                center: view.to_screen(pickup.pos),
                size: pickup.size,
                color: pickup.color,
            });
        }

        let player_color = state.archetype.map_or(palette::WHITE, |a| a.color());
        for dot in shapes::trail_dots(&state.player.trail, state.player.radius) {
            commands.push(DrawCommand::Circle {
                center: view.to_screen(dot.pos),
                radius: dot.radius,
                color: player_color.with_alpha((dot.alpha * 255.0) as u8),
            });
        }

        for projectile in state.projectiles.iter().filter(|p| view.visible(p.pos, p.radius)) {
            commands.push(DrawCommand::Circle {
                center: view.to_screen(projectile.pos),
                radius: projectile.radius,
                color: projectile.color,
            });
        }

        let player_screen = view.to_screen(state.player.pos);
        for enemy in state
            .enemies
            .iter()
            .filter(|e| view.visible(e.pos, e.kind.collision_radius()))
        {
            commands.push(enemy_command(
                &enemy.kind,
                view.to_screen(enemy.pos),
                player_screen,
                enemy.color(),
            ));
        }

        if let Some(orbital) = &state.weapons.orbital {
            commands.push(DrawCommand::Circle {
                center: view.to_screen(orbital.pos),
                radius: state.tuning.orbital.radius,
                color: palette::BLUE,
            });
        }

        commands.push(DrawCommand::Circle {
            center: player_screen,
            radius: state.player.radius,
            color: player_color,
        });
    }

    Frame {
        commands,
        hud: build_hud(state),
    }
}
