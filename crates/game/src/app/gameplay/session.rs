use std::rc::Rc;

use engine::{
    AssetStore, Camera, FadingText, PipelineContext, SharedAudio, StateHandoff, StateKey, Tilemap,
    Vec2,
};
use tracing::info;

use super::flow::{FlowContext, StateFlow};
use super::npc::SoundCue;
use super::player::Player;
use super::save::SaveStore;

/// Notices fade out of the bottom-right corner of the screen.
pub(crate) const NOTICE_SPEED: f32 = 3.0;
pub(crate) const NOTICE_START_ALPHA: f32 = 230.0;

/// Everything a state needs that outlives any one state.
#[derive(Clone)]
pub(crate) struct GameResources {
    pub(crate) assets: Rc<AssetStore>,
    pub(crate) tilemap: Rc<Tilemap>,
    pub(crate) audio: SharedAudio,
    pub(crate) saves: SaveStore,
    pub(crate) viewport: (u32, u32),
}

/// Shared state of one game session, threaded through every game stage.
pub(crate) struct PlaySession {
    pub(crate) player: Player,
    pub(crate) tilemap: Rc<Tilemap>,
    pub(crate) camera: Camera,
    pub(crate) viewport: (u32, u32),
    pub(crate) cues: Vec<SoundCue>,
    pub(crate) notices: Vec<FadingText>,
    pub(crate) paused: bool,
    pub(crate) flow: StateFlow,
    /// Music position accumulated across track restarts, in milliseconds.
    pub(crate) music_offset_ms: f64,
    pub(crate) audio: SharedAudio,
    pub(crate) saves: SaveStore,
}

impl PlaySession {
    pub(crate) fn new(
        player: Player,
        resources: &GameResources,
        handoff: StateHandoff,
    ) -> Self {
        let (width, height) = resources.viewport;
        Self {
            player,
            tilemap: Rc::clone(&resources.tilemap),
            camera: Camera::new(width, height),
            viewport: resources.viewport,
            cues: Vec::new(),
            notices: Vec::new(),
            paused: false,
            flow: StateFlow::default(),
            music_offset_ms: handoff.music_position_ms,
            audio: Rc::clone(&resources.audio),
            saves: resources.saves.clone(),
        }
    }

    pub(crate) fn notify(&mut self, text: &str, speed: f32) {
        let (width, height) = self.viewport;
        self.notices.push(FadingText::new(
            text,
            Vec2::new(width as f32 - 2.0, height as f32),
            speed,
            NOTICE_START_ALPHA,
        ));
    }

    pub(crate) fn request_state(&mut self, key: StateKey) {
        self.flow.request(key);
    }
}

impl PipelineContext for PlaySession {
    fn is_frozen(&self) -> bool {
        self.paused
    }

    fn next_state(&self) -> Option<StateKey> {
        self.flow.next()
    }

    fn exit_requested(&self) -> bool {
        self.flow.exit_requested()
    }

    fn handoff(&self) -> StateHandoff {
        StateHandoff {
            music_position_ms: self.music_offset_ms,
        }
    }
}

impl FlowContext for PlaySession {
    fn flow(&self) -> &StateFlow {
        &self.flow
    }

    fn flow_mut(&mut self) -> &mut StateFlow {
        &mut self.flow
    }

    /// Every exit from a game session saves progress, the death restart
    /// included.
    fn before_switch(&mut self, next: StateKey) {
        self.saves.persist_settings(&self.player.settings);
        let mut audio = self.audio.borrow_mut();
        self.music_offset_ms += audio.music_position_ms();
        audio.stop_music();
        info!(
            next = ?next,
            music_offset_ms = self.music_offset_ms,
            "game_session_closed"
        );
    }
}
