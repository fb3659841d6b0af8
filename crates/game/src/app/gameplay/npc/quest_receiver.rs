use tracing::info;

use super::dialogue::split_script;
use super::{Dialogue, SoundCue};
use crate::app::gameplay::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiverPhase {
    Waiting,
    /// Player came by with every item; the thank-you script is showing.
    Acknowledged,
    Completed,
}

/// NPC that takes a set of items and pays one seashell for them.
///
/// The opening check only looks at the save once, on the first update. After
/// that, acknowledgement and delivery can happen on the same frame when the
/// player was already talking as they walked up with the items.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestReceiver {
    items: Vec<String>,
    text_if_item: String,
    phase: ReceiverPhase,
    opening_checked: bool,
}

impl QuestReceiver {
    pub(crate) fn new(items: &str, text_if_item: impl Into<String>) -> Self {
        Self {
            items: split_script(items),
            text_if_item: text_if_item.into(),
            phase: ReceiverPhase::Waiting,
            opening_checked: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn items(&self) -> &[String] {
        &self.items
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> ReceiverPhase {
        self.phase
    }

    /// Every required item is held and none has been handed over yet.
    pub(crate) fn quest_ongoing(&self, player: &Player) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| player.settings.carries(item))
    }

    pub(crate) fn quest_done(&self, player: &Player) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| player.settings.delivered(item))
    }

    pub(crate) fn update(
        &mut self,
        dialogue: &mut Dialogue,
        player: &mut Player,
        cues: &mut Vec<SoundCue>,
    ) {
        if !self.opening_checked {
            self.opening_checked = true;
            if self.quest_done(player) {
                dialogue.swap_script(&self.text_if_item);
                self.phase = ReceiverPhase::Completed;
                return;
            }
        }

        let ongoing = self.quest_ongoing(player);
        if self.phase == ReceiverPhase::Waiting && dialogue.interacting() && ongoing {
            self.phase = ReceiverPhase::Acknowledged;
            dialogue.swap_script(&self.text_if_item);
        }

        if self.phase == ReceiverPhase::Acknowledged
            && dialogue.talking()
            && player.settings.complete_delivery(&self.items)
        {
            self.phase = ReceiverPhase::Completed;
            cues.push(SoundCue::QuestReceive);
            info!(
                items = ?self.items,
                seashells = player.settings.seashells,
                "quest_delivered"
            );
        }
    }

    pub(crate) fn shows_exclamation(&self) -> bool {
        self.phase != ReceiverPhase::Completed
    }
}

#[cfg(test)]
mod tests {
    use engine::Vec2;

    use super::*;
    use crate::app::gameplay::npc::DEFAULT_PROMPT;
    use crate::app::gameplay::settings::PlayerSettings;

    fn setup() -> (QuestReceiver, Dialogue, Player) {
        (
            QuestReceiver::new("net\n\nbucket", "Perfect, here is a seashell."),
            Dialogue::new("Bring me a net and a bucket."),
            Player::new(Vec2::new(10.0, 16.0), PlayerSettings::default()),
        )
    }

    #[test]
    fn seashell_is_paid_exactly_once() {
        let (mut receiver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();
        player.settings.grant("net");
        player.settings.grant("bucket");

        // walking up acknowledges without paying
        dialogue.update(true, 0, 1.0);
        receiver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(receiver.phase(), ReceiverPhase::Acknowledged);
        assert_eq!(dialogue.lines(), [DEFAULT_PROMPT, "Perfect, here is a seashell."]);
        assert_eq!(player.settings.seashells, 0);

        for _ in 0..30 {
            dialogue.update(true, 1, 1.0);
            receiver.update(&mut dialogue, &mut player, &mut cues);
        }
        assert_eq!(player.settings.seashells, 1);
        assert_eq!(cues, vec![SoundCue::QuestReceive]);
        assert!(!receiver.quest_ongoing(&player));
        assert!(receiver.quest_done(&player));
        assert!(!receiver.shows_exclamation());
    }

    #[test]
    fn partial_items_never_acknowledge() {
        let (mut receiver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();
        player.settings.grant("net");

        for _ in 0..5 {
            dialogue.update(true, 1, 1.0);
            receiver.update(&mut dialogue, &mut player, &mut cues);
        }
        assert_eq!(receiver.phase(), ReceiverPhase::Waiting);
        assert_eq!(player.settings.seashells, 0);
        assert!(receiver.shows_exclamation());
    }

    #[test]
    fn already_talking_delivers_on_arrival_frame() {
        let (mut receiver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();

        dialogue.update(true, 1, 1.0);
        receiver.update(&mut dialogue, &mut player, &mut cues);
        player.settings.grant("net");
        player.settings.grant("bucket");

        dialogue.update(true, 0, 1.0);
        receiver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(receiver.phase(), ReceiverPhase::Completed);
        assert_eq!(player.settings.seashells, 1);
    }

    #[test]
    fn opening_check_only_runs_on_first_update() {
        let (mut receiver, mut dialogue, mut player) = setup();
        let mut cues = Vec::new();
        player.settings.grant("net");
        player.settings.grant("bucket");
        player.settings.complete_delivery(&["net", "bucket"]);

        receiver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(receiver.phase(), ReceiverPhase::Completed);
        assert_eq!(dialogue.lines()[1], "Perfect, here is a seashell.");

        dialogue.update(true, 1, 1.0);
        receiver.update(&mut dialogue, &mut player, &mut cues);
        assert_eq!(dialogue.line_index(), 1);
        assert_eq!(player.settings.seashells, 1);
        assert!(cues.is_empty());
    }

    #[test]
    fn items_split_like_script_lines() {
        let (receiver, _, _) = setup();
        assert_eq!(receiver.items(), ["net", "bucket"]);
    }
}
