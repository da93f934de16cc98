//! Swarm Survivor entry point
//!
//! Runs a headless session driven by the autopilot: fixed timestep, events
//! routed to audio, a frame built every tick, and a summary at exit.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use swarm_survivor::audio::{AudioManager, LogBackend, SoundBank};
use swarm_survivor::autopilot::Autopilot;
use swarm_survivor::consts::{FPS, FRAME_DT};
use swarm_survivor::renderer::build_frame;
use swarm_survivor::sim::{Archetype, GameEvent, GamePhase, GameState, tick};
use swarm_survivor::{Tuning, format_clock};

#[derive(Parser, Debug)]
#[command(name = "swarm-survivor")]
#[command(about = "Headless Swarm Survivor session played by the autopilot")]
struct Cli {
    /// Run seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,
    /// JSON tuning file overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds to play
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,
    /// standard, triple_shot, nova_burst or bouncing_shot
    #[arg(long, default_value = "standard")]
    archetype: String,
    /// Directory containing the `audio/` folder
    #[arg(long, default_value = ".")]
    assets: PathBuf,
    /// Sound effect volume override (0.0 - 1.0)
    #[arg(long)]
    sfx_volume: Option<f32>,
    /// Run without sound
    #[arg(long)]
    mute: bool,
}

/// Game instance holding all state
struct Game {
    state: GameState,
    pilot: Autopilot,
    audio: AudioManager<LogBackend>,
    frames: u64,
    draw_calls: u64,
    runs: u32,
    best_kills: u32,
}

impl Game {
    fn new(seed: u64, tuning: Tuning, archetype: Archetype, bank: SoundBank) -> Result<Self> {
        let audio = AudioManager::new(LogBackend::default(), bank, &tuning.audio);
        Ok(Self {
            state: GameState::try_new(seed, tuning)?,
            pilot: Autopilot::new(archetype),
            audio,
            frames: 0,
            draw_calls: 0,
            runs: 0,
            best_kills: 0,
        })
    }

    /// One fixed step. Returns false once quit was requested.
    fn update(&mut self) -> bool {
        let input = self.pilot.input(&self.state);
        tick(&mut self.state, &input, FRAME_DT);
        self.frames += 1;

        let events = self.state.drain_events();
        let mut keep_running = true;
        for event in &events {
            match event {
                GameEvent::RunStarted => self.runs += 1,
                GameEvent::PlayerDied => {
                    self.best_kills = self.best_kills.max(self.state.kill_count);
                    log::info!(
                        "Run {} over at {}: {} kills, level {}",
                        self.runs,
                        format_clock(self.state.elapsed),
                        self.state.kill_count,
                        self.state.progression.level
                    );
                }
                GameEvent::UpgradePurchased(upgrade) => log::info!("Bought {}", upgrade.label()),
                GameEvent::QuitRequested => keep_running = false,
                _ => {}
            }
        }
        self.audio.handle_events(&events);

        let frame = build_frame(&self.state);
        self.draw_calls += frame.len() as u64;
        if self.frames % (FPS as u64 * 10) == 0 {
            log::debug!(
                "{} {:?}: health {}/{}, bar {:.0}%, {} enemies",
                frame.hud.clock,
                frame.hud.phase,
                frame.hud.health,
                frame.hud.max_health,
                frame.hud.bar_fraction * 100.0,
                self.state.enemies.len()
            );
        }
        keep_running
    }
}

fn default_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let archetype = Archetype::from_id(&cli.archetype)
        .ok_or_else(|| anyhow!("unknown archetype '{}'", cli.archetype))?;
    let tuning = Tuning::load_or_default(cli.config.as_deref()).with_context(|| {
        format!(
            "loading tuning from {}",
            cli.config
                .as_deref()
                .map_or("defaults".into(), |p| p.display().to_string())
        )
    })?;
    if !(cli.seconds.is_finite() && cli.seconds > 0.0) {
        return Err(anyhow!("--seconds must be positive, got {}", cli.seconds));
    }

    let seed = cli.seed.unwrap_or_else(default_seed);
    log::info!("Swarm Survivor (headless) starting, seed {seed}, {}", archetype.name());

    let bank = SoundBank::load(&cli.assets);
    let mut game = Game::new(seed, tuning, archetype, bank)?;
    if let Some(volume) = cli.sfx_volume {
        game.audio.set_sfx_volume(volume);
    }
    game.audio.set_muted(cli.mute);

    let total_frames = (cli.seconds * FPS as f32).ceil() as u64;
    while game.frames < total_frames {
        if !game.update() {
            break;
        }
    }

    let state = &game.state;
    if state.phase != GamePhase::GameOver {
        game.best_kills = game.best_kills.max(state.kill_count);
    }
    log::info!(
        "Session done after {} frames: {} run(s), best kills {}",
        game.frames,
        game.runs,
        game.best_kills
    );
    log::info!(
        "Current run {} with {} kills at level {} ({:?})",
        format_clock(state.elapsed),
        state.kill_count,
        state.progression.level,
        state.phase
    );
    log::info!(
        "{} draw calls, {} clips played",
        game.draw_calls,
        game.audio.backend().clips_played
    );
    Ok(())
}
