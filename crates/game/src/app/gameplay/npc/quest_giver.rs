use tracing::info;

use super::{Dialogue, SoundCue};
use crate::app::gameplay::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GiverPhase {
    /// Item neither carried nor delivered; talking hands it out.
    Offering,
    /// Item carried.
    Ongoing,
    /// Item delivered somewhere; the post-quest script is showing.
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestGiver {
    pub(crate) item: String,
    text_if_item: String,
    phase: GiverPhase,
}

impl QuestGiver {
    pub(crate) fn new(item: impl Into<String>, text_if_item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            text_if_item: text_if_item.into(),
            phase: GiverPhase::Offering,
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> GiverPhase {
        self.phase
    }

    /// Runs after the dialogue has seen this frame's input.
    pub(crate) fn update(
        &mut self,
        dialogue: &mut Dialogue,
        player: &mut Player,
        cues: &mut Vec<SoundCue>,
    ) {
        if player.settings.delivered(&self.item) {
            if self.phase != GiverPhase::Completed {
                self.phase = GiverPhase::Completed;
                dialogue.swap_script(&self.text_if_item);
            }
            return;
        }
        if self.phase == GiverPhase::Completed {
            return;
        }
        if player.settings.carries(&self.item) {
            self.phase = GiverPhase::Ongoing;
            return;
        }

        if dialogue.talking() && player.settings.grant(&self.item) {
            self.phase = GiverPhase::Ongoing;
            player.new_quest = true;
            cues.push(SoundCue::QuestGive);
            info!(item = self.item.as_str(), "quest_granted");
        }
    }

    pub(crate) fn shows_exclamation(&self, dialogue: &Dialogue) -> bool {
        self.phase == GiverPhase::Offering && !dialogue.talking()
    }
}

#[cfg(test)]
mod tests {
    use engine::Vec2;

    use super::*;
    use crate::app::gameplay::settings::PlayerSettings;

    fn setup() -> (QuestGiver, Dialogue, Player) {
        (
            QuestGiver::new("shell_key", "You found my key!\n\nThanks."),
            Dialogue::new("I lost my key.\n\nCan you bring it to the lighthouse?"),
            Player::new(Vec2::new(10.0, 16.0), PlayerSettings::default()),
        )
    }

    #[test]
    fn talking_grants_item_once() {
        let (mut giver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();

        giver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(giver.phase(), GiverPhase::Offering);
        assert!(giver.shows_exclamation(&dialogue));

        dialogue.update(true, 1, 1.0);
        giver.update(&mut dialogue, &mut player, &mut cues);
        assert!(player.settings.carries("shell_key"));
        assert!(player.new_quest);
        assert_eq!(cues, vec![SoundCue::QuestGive]);

        player.new_quest = false;
        for _ in 0..5 {
            dialogue.update(true, 1, 1.0);
            giver.update(&mut dialogue, &mut player, &mut cues);
        }
        assert!(!player.new_quest);
        assert_eq!(cues.len(), 1);
        assert_eq!(giver.phase(), GiverPhase::Ongoing);
        assert!(!giver.shows_exclamation(&dialogue));
    }

    #[test]
    fn delivered_item_swaps_script_exactly_once() {
        let (mut giver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();
        player.settings.grant("shell_key");
        player.settings.complete_delivery(&["shell_key"]);

        giver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(giver.phase(), GiverPhase::Completed);
        assert_eq!(dialogue.lines()[1], "You found my key!");

        dialogue.update(true, 2, 1.0);
        giver.update(&mut dialogue, &mut player, &mut cues);
        // a second swap would have rewound to the prompt
        assert_eq!(dialogue.line_index(), 2);
        assert!(cues.is_empty());
        assert!(!player.settings.carries("shell_key"));
    }

    #[test]
    fn carried_item_from_save_skips_offer() {
        let (mut giver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();
        player.settings.grant("shell_key");

        dialogue.update(true, 1, 1.0);
        giver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(giver.phase(), GiverPhase::Ongoing);
        assert!(!player.new_quest);
        assert!(cues.is_empty());
    }
}
