use engine::{
    BitmapFont, InputAction, InputSnapshot, PipelineContext, Rect, Sprite, Stage, StagePipeline,
    StateHandoff, StateKey, Surface, Vec2,
};
use tracing::info;

use super::flow::{FlowContext, StateFlow, TransitionStage};
use super::save::SaveStore;
use super::session::GameResources;
use super::settings::GameFlags;
use super::text::render_outlined;
use super::GameBuildError;

const INTRO_PAGES: &[&str] = &[
    "Summer is almost over.",
    "Your friends are waiting for you at the beach, far past the edge of town.",
    "Help the neighbours along the way. Some of them pay in seashells.",
    "The lifeguard will not let anyone through without five seashells.",
];
const CREDITS_PAGES: &[&str] = &[
    "You made it to the beach!",
    "Made with a tiny pixel engine.",
    "Thanks for playing.",
];
const CONTINUE_HINT: &str = "Press E to continue";
const PAGE_WRAP_WIDTH: u32 = 240;
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// What happens when the last page is dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardKind {
    Intro,
    Credits,
}

pub(crate) struct CardSession {
    kind: CardKind,
    flow: StateFlow,
    saves: SaveStore,
    flags: GameFlags,
    page: usize,
    page_count: usize,
    music_position_ms: f64,
}

impl PipelineContext for CardSession {
    fn next_state(&self) -> Option<StateKey> {
        self.flow.next()
    }

    fn exit_requested(&self) -> bool {
        self.flow.exit_requested()
    }

    fn handoff(&self) -> StateHandoff {
        StateHandoff {
            music_position_ms: self.music_position_ms,
        }
    }
}

impl FlowContext for CardSession {
    fn flow(&self) -> &StateFlow {
        &self.flow
    }

    fn flow_mut(&mut self) -> &mut StateFlow {
        &mut self.flow
    }

    fn before_switch(&mut self, next: StateKey) {
        if self.kind == CardKind::Intro {
            self.flags.run_intro = false;
            self.saves.persist_flags(&self.flags);
        }
        info!(card = ?self.kind, next = ?next, "cards_finished");
    }
}

/// Pages of text on black, advanced by interact, jump or a click.
struct PageStage {
    pages: Vec<Sprite>,
    hint: Sprite,
}

impl PageStage {
    fn new(font: &BitmapFont, pages: &[&str]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|page| render_outlined(font, page, PAGE_WRAP_WIDTH))
                .collect(),
            hint: render_outlined(font, CONTINUE_HINT, u32::MAX),
        }
    }
}

impl Stage<CardSession> for PageStage {
    fn name(&self) -> &'static str {
        "pages"
    }

    fn update(&mut self, cards: &mut CardSession, input: &InputSnapshot) {
        let advances = input.pressed_count(InputAction::Interact) as usize
            + input.pressed_count(InputAction::Jump) as usize
            + usize::from(input.left_click_pressed());
        for _ in 0..advances {
            if cards.page + 1 < cards.page_count {
                cards.page += 1;
                continue;
            }
            let next = match cards.kind {
                CardKind::Intro => StateKey::Game,
                CardKind::Credits => StateKey::Menu,
            };
            cards.flow.request(next);
        }
    }

    fn draw(&mut self, cards: &CardSession, surface: &mut Surface, _input: &InputSnapshot) {
        surface.clear(BACKGROUND);
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        if let Some(page) = self.pages.get(cards.page) {
            let rect = Rect::from_midbottom(
                Vec2::new(width / 2.0, height / 2.0 + page.height() as f32 / 2.0),
                page.size(),
            );
            surface.blit(page, rect.topleft(), 255);
        }
        let hint = Rect::from_bottomright(Vec2::new(width - 4.0, height - 4.0), self.hint.size());
        surface.blit(&self.hint, hint.topleft(), 160);
    }
}

fn build_cards(
    kind: CardKind,
    pages: &[&str],
    resources: &GameResources,
    handoff: StateHandoff,
) -> Result<StagePipeline<CardSession>, GameBuildError> {
    let flags = resources.saves.load_flags()?;
    let session = CardSession {
        kind,
        flow: StateFlow::default(),
        saves: resources.saves.clone(),
        flags,
        page: 0,
        page_count: pages.len(),
        music_position_ms: handoff.music_position_ms,
    };
    let name = match kind {
        CardKind::Intro => "intro",
        CardKind::Credits => "credits",
    };
    Ok(StagePipeline::new(name, session)
        .with_stage(PageStage::new(resources.assets.font(), pages))
        .with_stage(TransitionStage))
}

pub(crate) fn build_intro(
    resources: &GameResources,
    handoff: StateHandoff,
) -> Result<StagePipeline<CardSession>, GameBuildError> {
    build_cards(CardKind::Intro, INTRO_PAGES, resources, handoff)
}

/// Credits start the soundtrack over.
pub(crate) fn build_credits(
    resources: &GameResources,
    _handoff: StateHandoff,
) -> Result<StagePipeline<CardSession>, GameBuildError> {
    build_cards(CardKind::Credits, CREDITS_PAGES, resources, StateHandoff::default())
}
