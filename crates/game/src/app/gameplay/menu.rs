use engine::{
    AssetError, Button, ButtonColors, InputSnapshot, ParallaxBackground, ParallaxLayer,
    PipelineContext, SharedAudio, Stage, StagePipeline, StateHandoff, StateKey, Surface, Vec2,
};
use tracing::info;

use super::flow::{FlowContext, StateFlow, TransitionStage};
use super::session::GameResources;
use super::GameBuildError;

pub(crate) const AMBIENCE: &str = "grey";
pub(crate) const PLAY: &str = "play";
pub(crate) const EXIT: &str = "exit";

const MENU_BUTTON_SIZE: Vec2 = Vec2::new(96.0, 32.0);
const MENU_BUTTON_COLORS: ButtonColors = ButtonColors {
    idle: [102, 102, 102, 255],
    hover: [51, 51, 51, 255],
    text: [0, 0, 0, 255],
};
const CURSOR_PARALLAX_DIVISOR: f32 = 10.0;

pub(crate) struct MenuSession {
    flow: StateFlow,
    audio: SharedAudio,
    run_intro: bool,
    music_position_ms: f64,
    scroll: Vec2,
    viewport: (u32, u32),
}

impl PipelineContext for MenuSession {
    fn next_state(&self) -> Option<StateKey> {
        self.flow.next()
    }

    fn exit_requested(&self) -> bool {
        self.flow.exit_requested()
    }

    /// The menu never touches the soundtrack, so the incoming position
    /// passes straight through.
    fn handoff(&self) -> StateHandoff {
        StateHandoff {
            music_position_ms: self.music_position_ms,
        }
    }
}

impl FlowContext for MenuSession {
    fn flow(&self) -> &StateFlow {
        &self.flow
    }

    fn flow_mut(&mut self) -> &mut StateFlow {
        &mut self.flow
    }

    fn before_switch(&mut self, next: StateKey) {
        self.audio.borrow_mut().stop_sound(AMBIENCE);
        info!(next = ?next, "menu_closed");
    }
}

/// Background that drifts with the cursor.
struct MenuBackgroundStage {
    background: ParallaxBackground,
}

impl Stage<MenuSession> for MenuBackgroundStage {
    fn name(&self) -> &'static str {
        "background"
    }

    fn update(&mut self, menu: &mut MenuSession, input: &InputSnapshot) {
        let cursor_x = input.cursor_position_px().map_or(0.0, |cursor| cursor.x);
        let half_width = (menu.viewport.0 / 2) as f32;
        let target = (cursor_x / CURSOR_PARALLAX_DIVISOR).floor();
        menu.scroll.x += (target - menu.scroll.x - half_width).floor() * input.dt();
    }

    fn draw(&mut self, menu: &MenuSession, surface: &mut Surface, _input: &InputSnapshot) {
        self.background.draw(surface, menu.scroll);
    }
}

struct MenuButtonStage {
    buttons: Vec<Button>,
}

impl Stage<MenuSession> for MenuButtonStage {
    fn name(&self) -> &'static str {
        "buttons"
    }

    fn update(&mut self, menu: &mut MenuSession, input: &InputSnapshot) {
        for button in &mut self.buttons {
            button.update(input);
            if !button.clicked() {
                continue;
            }
            match button.label {
                EXIT => menu.flow.request_exit(),
                PLAY if menu.run_intro => menu.flow.request(StateKey::Intro),
                PLAY => menu.flow.request(StateKey::Game),
                _ => {}
            }
        }
    }

    fn draw(&mut self, _menu: &MenuSession, surface: &mut Surface, _input: &InputSnapshot) {
        for button in &self.buttons {
            button.draw(surface);
        }
    }
}

pub(crate) fn build_menu(
    resources: &GameResources,
    handoff: StateHandoff,
) -> Result<StagePipeline<MenuSession>, GameBuildError> {
    let assets = &resources.assets;
    let flags = resources.saves.load_flags()?;
    let layer = |name: &str, factor: f32| -> Result<ParallaxLayer, AssetError> {
        Ok(ParallaxLayer {
            sprite: assets.sprite(name)?,
            factor,
        })
    };
    let background = ParallaxBackground::new(vec![
        layer("bg0", 0.05)?,
        layer("bg1", 0.15)?,
        layer("bg2", 0.3)?,
    ]);
    let buttons = Button::column(
        &[EXIT, PLAY],
        resources.viewport,
        MENU_BUTTON_SIZE,
        MENU_BUTTON_COLORS,
        assets.font(),
    );

    resources.audio.borrow_mut().play_sound(AMBIENCE);
    let menu = MenuSession {
        flow: StateFlow::default(),
        audio: resources.audio.clone(),
        run_intro: flags.run_intro,
        music_position_ms: handoff.music_position_ms,
        scroll: Vec2::ZERO,
        viewport: resources.viewport,
    };
    Ok(StagePipeline::new("menu", menu)
        .with_stage(MenuBackgroundStage { background })
        .with_stage(MenuButtonStage { buttons })
        .with_stage(TransitionStage))
}
