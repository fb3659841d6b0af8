use engine::{Expansion, InputAction, InputSnapshot, Rect};
use tracing::info;

use super::SoundCue;
use crate::app::gameplay::player::Player;

pub(crate) const PICKUP_PROMPT: &str = "Press E to pick up";

/// An item lying in the world. Once picked up (now or in an earlier session)
/// it stays hidden.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItemPickup {
    pub(crate) item: String,
    pub(crate) rect: Rect,
    picked_up: bool,
    prompt_alpha: Expansion,
}

impl ItemPickup {
    pub(crate) fn new(item: impl Into<String>, rect: Rect) -> Self {
        Self {
            item: item.into(),
            rect,
            picked_up: false,
            prompt_alpha: Expansion::new(0.0, 0.0, 255.0, 25.0),
        }
    }

    pub(crate) fn picked_up(&self) -> bool {
        self.picked_up
    }

    pub(crate) fn prompt_alpha(&self) -> u8 {
        self.prompt_alpha.alpha()
    }

    pub(crate) fn update(
        &mut self,
        input: &InputSnapshot,
        player: &mut Player,
        cues: &mut Vec<SoundCue>,
    ) {
        if player.settings.owns(&self.item) {
            self.picked_up = true;
        }

        let overlapping = player.rect().intersects(&self.rect);
        if overlapping && !self.picked_up && input.was_pressed(InputAction::Interact) {
            self.picked_up = true;
            if player.settings.grant(&self.item) {
                cues.push(SoundCue::Pickup);
                info!(item = self.item.as_str(), "item_picked_up");
            }
        }

        self.prompt_alpha
            .update(overlapping && !self.picked_up, input.dt());
    }
}
