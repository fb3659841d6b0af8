mod dialogue;
mod item;
mod quest_giver;
mod quest_receiver;

use engine::{InputAction, InputSnapshot, MapObject, Rect, Vec2};
use thiserror::Error;

use super::player::{Facing, Player};

#[cfg(test)]
pub(crate) use dialogue::DEFAULT_PROMPT;
pub(crate) use dialogue::{Dialogue, BACKDROP_ALPHA_MAX};
pub(crate) use item::{ItemPickup, PICKUP_PROMPT};
pub(crate) use quest_giver::QuestGiver;
pub(crate) use quest_receiver::QuestReceiver;

pub(crate) const TALKING_NPC: &str = "talking_npc";
pub(crate) const QUEST_GIVER_NPC: &str = "quest_giver_npc";
pub(crate) const QUEST_RECEIVER_NPC: &str = "quest_receiver_npc";
pub(crate) const ITEM_NPC: &str = "item_npc";

/// Sound effects raised by gameplay and played by the audio stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SoundCue {
    QuestGive,
    QuestReceive,
    Pickup,
}

impl SoundCue {
    pub(crate) fn sound_name(self) -> &'static str {
        match self {
            SoundCue::QuestGive => "quest_give",
            SoundCue::QuestReceive => "quest_receive",
            SoundCue::Pickup => "pickup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum NpcError {
    #[error("npc '{name}' has unknown type '{kind}'")]
    UnknownKind { name: String, kind: String },
    #[error("npc '{name}' is missing property '{property}'")]
    MissingProperty {
        name: String,
        property: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NpcRole {
    Talking,
    QuestGiver(QuestGiver),
    QuestReceiver(QuestReceiver),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TalkingNpc {
    pub(crate) name: String,
    pub(crate) rect: Rect,
    pub(crate) dialogue: Dialogue,
    pub(crate) role: NpcRole,
    pub(crate) facing: Facing,
}

impl TalkingNpc {
    pub(crate) fn new(name: impl Into<String>, rect: Rect, script: &str, role: NpcRole) -> Self {
        Self {
            name: name.into(),
            rect,
            dialogue: Dialogue::new(script),
            role,
            facing: Facing::Left,
        }
    }

    pub(crate) fn update(
        &mut self,
        input: &InputSnapshot,
        player: &mut Player,
        cues: &mut Vec<SoundCue>,
    ) {
        let overlapping = self.rect.intersects(&player.rect());
        self.dialogue.update(
            overlapping,
            input.pressed_count(InputAction::Interact),
            input.dt(),
        );

        match &mut self.role {
            NpcRole::Talking => {}
            NpcRole::QuestGiver(giver) => giver.update(&mut self.dialogue, player, cues),
            NpcRole::QuestReceiver(receiver) => {
                receiver.update(&mut self.dialogue, player, cues)
            }
        }

        self.facing = if player.rect().x > self.rect.x {
            Facing::Right
        } else {
            Facing::Left
        };
    }

    /// Talk animation plays only while the player is in range and talking.
    pub(crate) fn is_animating_talk(&self) -> bool {
        self.dialogue.interacting() && self.dialogue.talking()
    }

    pub(crate) fn shows_exclamation(&self) -> bool {
        match &self.role {
            NpcRole::Talking => false,
            NpcRole::QuestGiver(giver) => giver.shows_exclamation(&self.dialogue),
            NpcRole::QuestReceiver(receiver) => receiver.shows_exclamation(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Npc {
    Talker(TalkingNpc),
    Item(ItemPickup),
}

impl Npc {
    /// Builds an NPC from a map object. `size` is its sprite size; the
    /// sprite is anchored at the object's bottom centre.
    pub(crate) fn from_object(object: &MapObject, size: Vec2) -> Result<Self, NpcError> {
        let rect = Rect::from_midbottom(object.rect.midbottom(), size);
        let property = |key: &'static str| {
            object
                .property(key)
                .ok_or_else(|| NpcError::MissingProperty {
                    name: object.name.clone(),
                    property: key,
                })
        };

        let role = match object.kind.as_str() {
            ITEM_NPC => return Ok(Npc::Item(ItemPickup::new(property("item")?, rect))),
            TALKING_NPC => NpcRole::Talking,
            QUEST_GIVER_NPC => {
                NpcRole::QuestGiver(QuestGiver::new(property("item")?, property("text_if_item")?))
            }
            QUEST_RECEIVER_NPC => NpcRole::QuestReceiver(QuestReceiver::new(
                property("item")?,
                property("text_if_item")?,
            )),
            other => {
                return Err(NpcError::UnknownKind {
                    name: object.name.clone(),
                    kind: other.to_string(),
                })
            }
        };
        Ok(Npc::Talker(TalkingNpc::new(
            object.name.clone(),
            rect,
            property("text")?,
            role,
        )))
    }

    /// Name of the sprite whose first frame sizes this NPC.
    pub(crate) fn sizing_sprite(object: &MapObject) -> String {
        if object.kind == ITEM_NPC {
            object.name.clone()
        } else {
            format!("{}_idle", object.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::app::gameplay::settings::PlayerSettings;

    fn object(kind: &str, properties: &[(&str, &str)]) -> MapObject {
        MapObject {
            name: "crab".to_string(),
            kind: kind.to_string(),
            rect: Rect::new(100.0, 60.0, 20.0, 20.0),
            properties: properties
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn sprite_is_anchored_at_object_midbottom() {
        let npc = Npc::from_object(&object(TALKING_NPC, &[("text", "hi")]), Vec2::new(12.0, 10.0))
            .expect("npc");
        let Npc::Talker(npc) = npc else {
            panic!("expected talker");
        };
        assert_eq!(npc.rect, Rect::new(104.0, 70.0, 12.0, 10.0));
    }

    #[test]
    fn builds_each_kind() {
        let size = Vec2::new(8.0, 8.0);
        let giver = Npc::from_object(
            &object(
                QUEST_GIVER_NPC,
                &[("text", "a"), ("item", "shell_key"), ("text_if_item", "b")],
            ),
            size,
        )
        .expect("giver");
        assert!(matches!(
            giver,
            Npc::Talker(TalkingNpc {
                role: NpcRole::QuestGiver(_),
                ..
            })
        ));

        let pickup = Npc::from_object(&object(ITEM_NPC, &[("item", "net")]), size).expect("item");
        assert!(matches!(pickup, Npc::Item(ItemPickup { ref item, .. }) if item == "net"));
    }

    #[test]
    fn missing_property_and_unknown_kind_are_errors() {
        let size = Vec2::new(8.0, 8.0);
        assert_eq!(
            Npc::from_object(&object(QUEST_RECEIVER_NPC, &[("text", "a")]), size),
            Err(NpcError::MissingProperty {
                name: "crab".to_string(),
                property: "item"
            })
        );
        assert!(matches!(
            Npc::from_object(&object("shopkeeper", &[]), size),
            Err(NpcError::UnknownKind { .. })
        ));
    }

    #[test]
    fn talker_faces_player_and_animates_only_in_range() {
        let mut npc = TalkingNpc::new(
            "crab",
            Rect::new(0.0, 0.0, 16.0, 16.0),
            "hello",
            NpcRole::Talking,
        );
        let mut settings = PlayerSettings::default();
        settings.set_checkpoint(8.0, 0.0);
        let mut player = Player::new(Vec2::new(10.0, 16.0), settings);
        let mut cues = Vec::new();

        npc.update(
            &InputSnapshot::empty().with_action_pressed(InputAction::Interact),
            &mut player,
            &mut cues,
        );
        assert_eq!(npc.facing, Facing::Right);
        assert!(npc.is_animating_talk());

        player.body.rect.x = 200.0;
        npc.update(&InputSnapshot::empty(), &mut player, &mut cues);
        assert!(!npc.is_animating_talk());
        assert!(!npc.shows_exclamation());
    }
}
