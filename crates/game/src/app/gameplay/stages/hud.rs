use std::collections::HashMap;

use engine::{
    AssetError, AssetStore, BitmapFont, InputSnapshot, Rect, Sprite, Stage, StateKey, Surface, Vec2,
};
use tracing::info;

use crate::app::gameplay::session::{PlaySession, NOTICE_SPEED};
use crate::app::gameplay::settings::GameFlags;
use crate::app::gameplay::text::render_outlined;

pub(crate) const QUEST_FINISHED: &str = "Quest finished!";
pub(crate) const NEW_QUEST: &str = "New quest!";
pub(crate) const NOT_ENOUGH_SEASHELLS: &str = "Not enough seashells!";
pub(crate) const YOU_MADE_IT: &str = "You made it!";

/// The beach is closed off at this world x until enough seashells are held.
pub(crate) const BARRIER_X: f32 = 290.0 * 16.0;
pub(crate) const REQUIRED_SEASHELLS: u32 = 5;
const MAX_NOTICES_FOR_WARNING: usize = 3;
const WARNING_SPEED: f32 = 5.0;
const ENDING_FADE_DIVISOR: f32 = 10.0;
const ENDING_MUSIC_FADEOUT_MS: u64 = 11_000;
const HUD_MARGIN: f32 = 2.0;

/// Seashell counter and the notice feed.
pub(crate) struct UiStage {
    icon: Sprite,
    font: BitmapFont,
    last_amount: u32,
    counter: Sprite,
    labels: HashMap<String, Sprite>,
}

impl UiStage {
    pub(crate) fn new(assets: &AssetStore, seashells: u32) -> Result<Self, AssetError> {
        let font = assets.font().clone();
        Ok(Self {
            icon: assets.sprite("seashell")?,
            counter: render_outlined(&font, &seashells.to_string(), u32::MAX),
            font,
            last_amount: seashells,
            labels: HashMap::new(),
        })
    }
}

impl Stage<PlaySession> for UiStage {
    fn name(&self) -> &'static str {
        "ui"
    }

    fn update(&mut self, session: &mut PlaySession, input: &InputSnapshot) {
        let amount = session.player.settings.seashells;
        if amount != self.last_amount {
            self.last_amount = amount;
            self.counter = render_outlined(&self.font, &amount.to_string(), u32::MAX);
            session.notify(QUEST_FINISHED, NOTICE_SPEED);
        }
        if session.player.new_quest {
            session.notify(NEW_QUEST, NOTICE_SPEED);
        }

        for notice in &mut session.notices {
            notice.update(input.dt());
        }
        session.notices.retain(|notice| notice.alive());
    }

    fn draw(&mut self, session: &PlaySession, surface: &mut Surface, _input: &InputSnapshot) {
        let height = surface.height() as f32;
        let icon = Rect::new(
            HUD_MARGIN,
            height - HUD_MARGIN - self.icon.height() as f32,
            self.icon.width() as f32,
            self.icon.height() as f32,
        );
        surface.blit(&self.icon, icon.topleft(), 255);
        let counter_pos = Vec2::new(
            icon.right() + HUD_MARGIN,
            icon.center_y() - (self.counter.height() / 2) as f32,
        );
        surface.blit(&self.counter, counter_pos, 255);

        for notice in &session.notices {
            let font = &self.font;
            let label = self
                .labels
                .entry(notice.text.clone())
                .or_insert_with(|| render_outlined(font, &notice.text, u32::MAX));
            let rect = Rect::from_bottomright(notice.position, label.size());
            surface.blit(label, rect.topleft(), notice.alpha());
        }
    }
}

/// Blocks the beach until the player holds enough seashells, and ends the
/// game once they reach it with them.
#[derive(Default)]
pub(crate) struct BeachStage {
    congratulated: bool,
}

impl Stage<PlaySession> for BeachStage {
    fn name(&self) -> &'static str {
        "beach"
    }

    fn update(&mut self, session: &mut PlaySession, _input: &InputSnapshot) {
        let seashells = session.player.settings.seashells;
        let body = &mut session.player.body;

        if body.rect.x > BARRIER_X && seashells < REQUIRED_SEASHELLS && body.vel.x > 0.0 {
            body.vel.x = 0.0;
            body.rect.x = BARRIER_X;
            if session.notices.len() < MAX_NOTICES_FOR_WARNING {
                session.notify(NOT_ENOUGH_SEASHELLS, WARNING_SPEED);
            }
        } else if body.rect.x >= BARRIER_X
            && seashells >= REQUIRED_SEASHELLS
            && !self.congratulated
        {
            self.congratulated = true;
            info!(seashells, "game_completed");
            session.notify(YOU_MADE_IT, NOTICE_SPEED);
            session.request_state(StateKey::Credits);
            session.flow.transition.fade_speed /= ENDING_FADE_DIVISOR;
            session.saves.persist_flags(&GameFlags::completed());
            session
                .audio
                .borrow_mut()
                .fadeout_music(ENDING_MUSIC_FADEOUT_MS);
        }
    }
}
