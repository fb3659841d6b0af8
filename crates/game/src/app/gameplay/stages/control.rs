use engine::{
    AssetStore, Button, ButtonColors, Color, InputAction, InputSnapshot, Stage, StateKey, Surface,
    Vec2,
};
use tracing::info;

use crate::app::gameplay::session::PlaySession;

pub(crate) const SAVE_AND_EXIT: &str = "save & exit";
pub(crate) const MAIN_MENU: &str = "main menu";
pub(crate) const CONTINUE: &str = "continue";

const PAUSE_BUTTON_SIZE: Vec2 = Vec2::new(64.0, 16.0);
const PAUSE_BUTTON_COLORS: ButtonColors = ButtonColors {
    idle: [109, 117, 141, 255],
    hover: [139, 147, 175, 255],
    text: [6, 6, 8, 255],
};
const DARKENER_COLOR: Color = [0, 0, 0, 255];
const DARKENER_ALPHA: u8 = 150;

pub(crate) const OST: &str = "ost";
pub(crate) const OST_QUIET: &str = "ost_quiet";
pub(crate) const OST_VOLUME: f32 = 0.4;
pub(crate) const OST_QUIET_VOLUME: f32 = 0.7;

/// Toggles pause on the pause key. While paused the frame drawn on entry is
/// held under a darkener and the menu buttons are live.
pub(crate) struct PauseStage {
    buttons: Vec<Button>,
    last_frame: Option<Surface>,
}

impl PauseStage {
    pub(crate) fn new(assets: &AssetStore, viewport: (u32, u32)) -> Self {
        Self {
            buttons: Button::column(
                &[SAVE_AND_EXIT, MAIN_MENU, CONTINUE],
                viewport,
                PAUSE_BUTTON_SIZE,
                PAUSE_BUTTON_COLORS,
                assets.font(),
            ),
            last_frame: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn button_rect(&self, label: &str) -> Option<engine::Rect> {
        self.buttons
            .iter()
            .find(|button| button.label == label)
            .map(Button::rect)
    }
}

impl Stage<PlaySession> for PauseStage {
    fn name(&self) -> &'static str {
        "pause"
    }

    fn update(&mut self, session: &mut PlaySession, input: &InputSnapshot) {
        for _ in 0..input.pressed_count(InputAction::Pause) {
            session.paused = !session.paused;
            info!(paused = session.paused, "pause_toggled");
        }

        if session.paused {
            for button in &mut self.buttons {
                button.update(input);
                if !button.clicked() {
                    continue;
                }
                match button.label {
                    SAVE_AND_EXIT => {
                        session.saves.persist_settings(&session.player.settings);
                        session.flow.request_exit();
                    }
                    MAIN_MENU => session.request_state(StateKey::Menu),
                    CONTINUE => {
                        session.paused = false;
                        info!(paused = false, "pause_toggled");
                    }
                    _ => {}
                }
            }
        }

        if !session.paused {
            self.last_frame = None;
        }
    }

    fn draw(&mut self, session: &PlaySession, surface: &mut Surface, _input: &InputSnapshot) {
        if !session.paused {
            return;
        }
        let frame = self.last_frame.get_or_insert_with(|| surface.clone());
        surface.blit_surface(frame, Vec2::ZERO);
        surface.fill(DARKENER_COLOR, DARKENER_ALPHA);
        for button in &self.buttons {
            button.draw(surface);
        }
    }

    fn runs_while_frozen(&self) -> bool {
        true
    }
}

/// Plays queued sound cues and keeps the soundtrack in step with pause.
pub(crate) struct AudioStage {
    quiet: bool,
}

impl AudioStage {
    /// Starts the soundtrack from the position handed over by the last state.
    pub(crate) fn start(session: &PlaySession) -> Self {
        let mut audio = session.audio.borrow_mut();
        audio.play_music(OST, session.music_offset_ms);
        audio.set_music_volume(OST_VOLUME);
        Self { quiet: false }
    }
}

impl Stage<PlaySession> for AudioStage {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn update(&mut self, session: &mut PlaySession, _input: &InputSnapshot) {
        let mut audio = session.audio.borrow_mut();
        for cue in session.cues.drain(..) {
            audio.play_sound(cue.sound_name());
        }

        if session.paused == self.quiet {
            return;
        }
        self.quiet = session.paused;
        session.music_offset_ms += audio.music_position_ms();
        let (track, volume) = if self.quiet {
            (OST_QUIET, OST_QUIET_VOLUME)
        } else {
            (OST, OST_VOLUME)
        };
        audio.stop_music();
        audio.play_music(track, session.music_offset_ms);
        audio.set_music_volume(volume);
    }

    fn runs_while_frozen(&self) -> bool {
        true
    }
}
