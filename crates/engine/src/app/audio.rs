use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use tracing::{debug, warn};

/// Fire-and-forget audio control. Implementations swallow device errors.
pub trait AudioSink {
    fn play_sound(&mut self, name: &str);
    fn stop_sound(&mut self, name: &str);
    fn play_music(&mut self, track: &str, start_ms: f64);
    fn stop_music(&mut self);
    fn set_music_volume(&mut self, volume: f32);
    fn fadeout_music(&mut self, duration_ms: u64);
    /// Milliseconds played since the last `play_music`.
    fn music_position_ms(&self) -> f64;
}

pub type SharedAudio = Rc<RefCell<dyn AudioSink>>;

/// Sink with no device behind it. Tracks music timing by wall clock so the
/// resume-position bookkeeping still works.
#[derive(Debug)]
pub struct SilentAudio {
    known_names: HashSet<String>,
    current_track: Option<String>,
    started_at: Option<Instant>,
    volume: f32,
}

impl SilentAudio {
    pub fn new(known_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            known_names: known_names.into_iter().collect(),
            current_track: None,
            started_at: None,
            volume: 1.0,
        }
    }

    pub fn shared(self) -> SharedAudio {
        Rc::new(RefCell::new(self))
    }

    fn check_known(&self, name: &str) {
        if !self.known_names.is_empty() && !self.known_names.contains(name) {
            warn!(name, "audio_unknown_name");
        }
    }
}

impl AudioSink for SilentAudio {
    fn play_sound(&mut self, name: &str) {
        self.check_known(name);
        debug!(name, "audio_play_sound");
    }

    fn stop_sound(&mut self, name: &str) {
        debug!(name, "audio_stop_sound");
    }

    fn play_music(&mut self, track: &str, start_ms: f64) {
        self.check_known(track);
        debug!(track, start_ms, volume = self.volume, "audio_play_music");
        self.current_track = Some(track.to_string());
        self.started_at = Some(Instant::now());
    }

    fn stop_music(&mut self) {
        debug!(track = ?self.current_track, "audio_stop_music");
        self.current_track = None;
        self.started_at = None;
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn fadeout_music(&mut self, duration_ms: u64) {
        debug!(track = ?self.current_track, duration_ms, "audio_fadeout_music");
    }

    fn music_position_ms(&self) -> f64 {
        self.started_at
            .map(|started| started.elapsed().as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    PlaySound(String),
    StopSound(String),
    PlayMusic { track: String, start_ms: f64 },
    StopMusic,
    SetMusicVolume(f32),
    FadeoutMusic(u64),
}

/// Records every command; music position is set by the test.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub commands: Vec<AudioCommand>,
    pub position_ms: f64,
}

impl RecordingAudio {
    pub fn sounds_played(&self, name: &str) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, AudioCommand::PlaySound(played) if played == name))
            .count()
    }
}

impl AudioSink for RecordingAudio {
    fn play_sound(&mut self, name: &str) {
        self.commands.push(AudioCommand::PlaySound(name.to_string()));
    }

    fn stop_sound(&mut self, name: &str) {
        self.commands.push(AudioCommand::StopSound(name.to_string()));
    }

    fn play_music(&mut self, track: &str, start_ms: f64) {
        self.commands.push(AudioCommand::PlayMusic {
            track: track.to_string(),
            start_ms,
        });
    }

    fn stop_music(&mut self) {
        self.commands.push(AudioCommand::StopMusic);
    }

    fn set_music_volume(&mut self, volume: f32) {
        self.commands.push(AudioCommand::SetMusicVolume(volume));
    }

    fn fadeout_music(&mut self, duration_ms: u64) {
        self.commands.push(AudioCommand::FadeoutMusic(duration_ms));
    }

    fn music_position_ms(&self) -> f64 {
        self.position_ms
    }
}
