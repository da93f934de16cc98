//! Audio signals
//!
//! The simulation emits [`GameEvent`]s; this module maps them to sound clips
//! and hands them to a playback backend. Missing files are logged once at
//! load time and the matching effect stays silent.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::IndexedRandom;

use crate::error::GameError;
use crate::settings::AudioSettings;
use crate::sim::state::{Archetype, GameEvent};

/// Sub-directory of the asset root holding all clips
pub const AUDIO_DIR: &str = "audio";

/// Looped track started with each run
pub const BACKGROUND_MUSIC: &str = "background_music_stage_1.mp3";

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Standard archetype shot
    SingleShot,
    /// Spread archetype shot
    TripleShot,
    /// Burst archetype shot
    NovaShot,
    /// Bouncer archetype shot
    BouncingShot,
    BoomerangShot,
    /// Enemy destroyed or player struck (one of several variants)
    EnemyHit,
    PlayerDeath,
    PickupCollect,
    /// Archetype chosen or upgrade bought
    Select,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 9] = [
        SoundEffect::SingleShot,
        SoundEffect::TripleShot,
        SoundEffect::NovaShot,
        SoundEffect::BouncingShot,
        SoundEffect::BoomerangShot,
        SoundEffect::EnemyHit,
        SoundEffect::PlayerDeath,
        SoundEffect::PickupCollect,
        SoundEffect::Select,
    ];

    /// Clip file names; effects with several entries pick one at random
    pub fn file_names(&self) -> &'static [&'static str] {
        match self {
            SoundEffect::SingleShot => &["single_shot.wav"],
            SoundEffect::TripleShot => &["triple_shot.wav"],
            SoundEffect::NovaShot => &["nova_shot.wav"],
            SoundEffect::BouncingShot => &["bouncing_shot.wav"],
            SoundEffect::BoomerangShot => &["boomerang_shot.wav"],
            SoundEffect::EnemyHit => &[
                "enemy_hit1.wav",
                "enemy_hit2.wav",
                "enemy_hit3.wav",
                "enemy_hit4.wav",
            ],
            SoundEffect::PlayerDeath => &["player_death.wav"],
            SoundEffect::PickupCollect => &["pickup_particle.wav"],
            SoundEffect::Select => &["select_player.wav"],
        }
    }

    pub fn for_shot(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Standard => SoundEffect::SingleShot,
            Archetype::Spread => SoundEffect::TripleShot,
            Archetype::Nova => SoundEffect::NovaShot,
            Archetype::Bouncer => SoundEffect::BouncingShot,
        }
    }

    /// Effect to play for a simulation event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Shot(archetype) => Some(Self::for_shot(*archetype)),
            GameEvent::BoomerangThrown => Some(SoundEffect::BoomerangShot),
            GameEvent::EnemyKilled { .. } | GameEvent::PlayerHit { .. } => {
                Some(SoundEffect::EnemyHit)
            }
            GameEvent::PlayerDied => Some(SoundEffect::PlayerDeath),
            GameEvent::PickupCollected { .. } => Some(SoundEffect::PickupCollect),
            GameEvent::ArchetypeSelected(_) | GameEvent::UpgradePurchased(_) => {
                Some(SoundEffect::Select)
            }
            _ => None,
        }
    }
}

/// Something that can actually make noise
pub trait AudioBackend {
    /// Play a one-shot clip at `volume` (0.0 - 1.0)
    fn play_clip(&mut self, path: &Path, volume: f32);
    /// Start (or restart) a music track
    fn play_music(&mut self, path: &Path, volume: f32, looped: bool);
}

/// Backend for headless runs: logs every request and keeps a tally
#[derive(Debug, Default)]
pub struct LogBackend {
    pub clips_played: usize,
    pub last_clip: Option<PathBuf>,
    pub music: Option<PathBuf>,
}

impl AudioBackend for LogBackend {
    fn play_clip(&mut self, path: &Path, volume: f32) {
        log::trace!("play {} at {:.2}", path.display(), volume);
        self.clips_played += 1;
        self.last_clip = Some(path.to_path_buf());
    }

    fn play_music(&mut self, path: &Path, volume: f32, looped: bool) {
        log::debug!("music {} at {:.2} (looped: {looped})", path.display(), volume);
        self.music = Some(path.to_path_buf());
    }
}

fn probe(path: PathBuf) -> Result<PathBuf, GameError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(GameError::AssetUnavailable {
            path,
            reason: "file not found".into(),
        })
    }
}

/// Clip paths that were found on disk
#[derive(Debug, Clone, Default)]
pub struct SoundBank {
    clips: HashMap<SoundEffect, Vec<PathBuf>>,
    music: Option<PathBuf>,
}

impl SoundBank {
    /// Bank with nothing loaded (every effect is silent)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up every clip under `<root>/audio`. Missing files are logged and
    /// skipped.
    pub fn load(root: &Path) -> Self {
        let dir = root.join(AUDIO_DIR);
        let mut bank = Self::empty();
        let mut missing = 0;

        for effect in SoundEffect::ALL {
            let found: Vec<PathBuf> = effect
                .file_names()
                .iter()
                .filter_map(|name| match probe(dir.join(name)) {
                    Ok(path) => Some(path),
                    Err(err) => {
                        log::warn!("{err}; {effect:?} degraded");
                        missing += 1;
                        None
                    }
                })
                .collect();
            if !found.is_empty() {
                bank.clips.insert(effect, found);
            }
        }

        bank.music = match probe(dir.join(BACKGROUND_MUSIC)) {
            Ok(path) => Some(path),
            Err(err) => {
                log::warn!("{err}; playing without music");
                missing += 1;
                None
            }
        };

        log::info!(
            "Sound bank loaded from {} ({} effects available, {missing} files missing)",
            dir.display(),
            bank.clips.len()
        );
        bank
    }

    /// Pick a clip for `effect` (random among variants)
    pub fn clip(&self, effect: SoundEffect) -> Option<&Path> {
        self.clips
            .get(&effect)?
            .choose(&mut rand::rng())
            .map(PathBuf::as_path)
    }

    pub fn music(&self) -> Option<&Path> {
        self.music.as_deref()
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    bank: SoundBank,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, bank: SoundBank, settings: &AudioSettings) -> Self {
        Self {
            backend,
            bank,
            master_volume: settings.master_volume.clamp(0.0, 1.0),
            sfx_volume: settings.sfx_volume.clamp(0.0, 1.0),
            music_volume: settings.music_volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect (silently skipped when muted or unavailable)
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(path) = self.bank.clip(effect) else {
            return;
        };
        self.backend.play_clip(path, vol);
    }

    fn start_music(&mut self) {
        if self.muted {
            return;
        }
        if let Some(path) = self.bank.music() {
            self.backend
                .play_music(path, self.master_volume * self.music_volume, true);
        }
    }

    /// React to one simulation event
    pub fn handle_event(&mut self, event: &GameEvent) {
        if matches!(event, GameEvent::RunStarted) {
            self.start_music();
        }
        if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for event in events {
            self.handle_event(event);
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
