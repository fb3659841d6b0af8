use std::collections::HashMap;
use std::rc::Rc;

use engine::{
    resolve_tile_collisions, Animation, AssetError, AssetStore, BitmapFont, InputSnapshot, Rect,
    Sprite, Stage, StateKey, Surface, Tilemap, Vec2,
};
use tracing::info;

use crate::app::gameplay::npc::{
    ItemPickup, Npc, SoundCue, TalkingNpc, BACKDROP_ALPHA_MAX, PICKUP_PROMPT,
};
use crate::app::gameplay::player::{Facing, Player, PlayerState};
use crate::app::gameplay::session::PlaySession;
use crate::app::gameplay::text::{draw_backed, render_outlined};
use crate::app::gameplay::GameBuildError;

const SPEECH_WRAP_WIDTH: u32 = 196;
/// Gap between a sprite's top edge and the text or marker above it.
const LABEL_GAP: f32 = 2.0;

/// One frame set for each facing. Source art faces left.
struct Facings {
    left: Animation,
    right: Animation,
}

impl Facings {
    fn new(frames: Rc<[Sprite]>, speed: f32) -> Self {
        let left = Animation::new(frames, speed);
        let right = left.mirrored();
        Self { left, right }
    }

    fn get_mut(&mut self, facing: Facing) -> &mut Animation {
        match facing {
            Facing::Left => &mut self.left,
            Facing::Right => &mut self.right,
        }
    }
}

/// A map NPC paired with the art that draws it.
enum Actor {
    Talker {
        npc: TalkingNpc,
        idle: Facings,
        talk: Facings,
    },
    Item {
        item: ItemPickup,
        sprite: Sprite,
    },
}

impl Actor {
    fn update(&mut self, input: &InputSnapshot, player: &mut Player, cues: &mut Vec<SoundCue>) {
        match self {
            Actor::Talker { npc, .. } => npc.update(input, player, cues),
            Actor::Item { item, .. } => item.update(input, player, cues),
        }
    }
}

fn label_anchor(rect: &Rect) -> Vec2 {
    Vec2::new(rect.center_x(), rect.top() - LABEL_GAP)
}

fn cached_label<'a>(
    labels: &'a mut HashMap<String, Sprite>,
    font: &BitmapFont,
    text: &str,
) -> &'a Sprite {
    labels
        .entry(text.to_string())
        .or_insert_with(|| render_outlined(font, text, SPEECH_WRAP_WIDTH))
}

pub(crate) struct NpcStage {
    actors: Vec<Actor>,
    exclamation: Sprite,
    font: BitmapFont,
    labels: HashMap<String, Sprite>,
    pickup_label: Sprite,
}

impl NpcStage {
    pub(crate) fn new(assets: &AssetStore, tilemap: &Tilemap) -> Result<Self, GameBuildError> {
        let mut actors = Vec::new();
        for object in tilemap.object_layer("npcs") {
            let size = assets.sprite(&Npc::sizing_sprite(object))?.size();
            let actor = match Npc::from_object(object, size)? {
                Npc::Talker(npc) => Actor::Talker {
                    idle: Facings::new(assets.frames(&format!("{}_idle", npc.name))?, 0.1),
                    talk: Facings::new(assets.frames(&format!("{}_talk", npc.name))?, 0.6),
                    npc,
                },
                Npc::Item(item) => Actor::Item {
                    sprite: assets.sprite(&object.name)?,
                    item,
                },
            };
            actors.push(actor);
        }
        info!(count = actors.len(), "npcs_spawned");

        let font = assets.font().clone();
        Ok(Self {
            actors,
            exclamation: assets.sprite("exclamation")?,
            pickup_label: render_outlined(&font, PICKUP_PROMPT, SPEECH_WRAP_WIDTH),
            font,
            labels: HashMap::new(),
        })
    }

    #[cfg(test)]
    fn counts(&self) -> (usize, usize) {
        let talkers = self
            .actors
            .iter()
            .filter(|actor| matches!(actor, Actor::Talker { .. }))
            .count();
        (talkers, self.actors.len() - talkers)
    }
}

impl Stage<PlaySession> for NpcStage {
    fn name(&self) -> &'static str {
        "npcs"
    }

    fn update(&mut self, session: &mut PlaySession, input: &InputSnapshot) {
        // the flag is only raised for the frame a quest is handed out
        session.player.new_quest = false;
        for actor in &mut self.actors {
            actor.update(input, &mut session.player, &mut session.cues);
        }
    }

    fn draw(&mut self, session: &PlaySession, surface: &mut Surface, input: &InputSnapshot) {
        let camera = &session.camera;
        for actor in &mut self.actors {
            match actor {
                Actor::Talker {
                    npc: talker,
                    idle,
                    talk,
                } => {
                    let anchor = label_anchor(&talker.rect);
                    if talker.shows_exclamation() {
                        let marker = Rect::from_midbottom(anchor, self.exclamation.size());
                        surface.blit(&self.exclamation, camera.apply(marker.topleft()), 255);
                    }

                    let animation = if talker.is_animating_talk() {
                        talk.get_mut(talker.facing)
                    } else {
                        idle.get_mut(talker.facing)
                    };
                    animation.play(surface, camera.apply_rect(&talker.rect), input.dt());

                    let dialogue = &talker.dialogue;
                    let label =
                        cached_label(&mut self.labels, &self.font, dialogue.current_line());
                    draw_backed(
                        surface,
                        label,
                        camera.apply(anchor),
                        dialogue.text_alpha(),
                        dialogue.backdrop_alpha(),
                    );
                }
                Actor::Item { item, sprite } => {
                    if !item.picked_up() {
                        surface.blit(sprite, camera.apply_rect(&item.rect), 255);
                    }
                    let alpha = item.prompt_alpha();
                    draw_backed(
                        surface,
                        &self.pickup_label,
                        camera.apply(item.rect.midtop()),
                        alpha,
                        alpha.min(BACKDROP_ALPHA_MAX),
                    );
                }
            }
        }
    }
}

pub(crate) struct PlayerStage {
    idle: Facings,
    walk: Facings,
    jump: Facings,
}

impl PlayerStage {
    pub(crate) fn new(assets: &AssetStore) -> Result<Self, AssetError> {
        Ok(Self {
            idle: Facings::new(assets.frames("player_idle")?, 0.05),
            walk: Facings::new(assets.frames("player_walk")?, 0.8),
            jump: Facings::new(assets.frames("player_jump")?, 0.0),
        })
    }
}

impl Stage<PlaySession> for PlayerStage {
    fn name(&self) -> &'static str {
        "player"
    }

    fn update(&mut self, session: &mut PlaySession, input: &InputSnapshot) {
        let player = &mut session.player;
        player.control(input);
        resolve_tile_collisions(&mut player.body, &session.tilemap, input.dt());
        if player.check_death() {
            info!(
                x = player.rect().x,
                y = player.rect().y,
                checkpoint = ?player.settings.checkpoint_pos,
                "player_died"
            );
            session.request_state(StateKey::Game);
        }
    }

    fn draw(&mut self, session: &PlaySession, surface: &mut Surface, input: &InputSnapshot) {
        let player = &session.player;
        let facings = match player.state {
            PlayerState::Idle => &mut self.idle,
            PlayerState::Walk => &mut self.walk,
            PlayerState::Jump => &mut self.jump,
        };
        facings.get_mut(player.facing).play(
            surface,
            session.camera.apply_rect(&player.rect()),
            input.dt(),
        );
    }
}

#[cfg(test)]
mod tests {
    use engine::{InputAction, StateHandoff};

    use super::*;
    use crate::app::gameplay::npc::SoundCue;
    use crate::app::gameplay::player::Player;
    use crate::app::gameplay::settings::PlayerSettings;
    use crate::app::gameplay::test_support::{self, TestGame, FLOOR_TOP};

    fn session_at(game: &TestGame, x: f32, y: f32) -> PlaySession {
        let mut settings = PlayerSettings::default();
        settings.set_checkpoint(x, y);
        let player = Player::new(Vec2::new(10.0, 16.0), settings);
        PlaySession::new(player, &game.resources, StateHandoff::default())
    }

    #[test]
    fn spawns_every_npc_from_the_map() {
        let game = TestGame::new();
        let stage = NpcStage::new(&game.resources.assets, &test_support::tilemap()).expect("npcs");
        assert_eq!(stage.counts(), (2, 1));
    }

    #[test]
    fn missing_npc_sprite_fails_the_build() {
        let game = TestGame::new();
        let raw = test_support::map_xml().replace(r#"name="gull""#, r#"name="heron""#);
        let tilemap = engine::parse_tmx(&raw).expect("map");
        let result = NpcStage::new(&game.resources.assets, &tilemap);
        assert!(matches!(
            result,
            Err(GameBuildError::Asset(AssetError::Missing { ref name })) if name == "heron_idle"
        ));
    }

    #[test]
    fn quest_flag_lasts_one_frame() {
        let game = TestGame::new();
        let mut stage =
            NpcStage::new(&game.resources.assets, &test_support::tilemap()).expect("npcs");
        let mut session = session_at(&game, 100.0, FLOOR_TOP - 16.0);
        let talk = InputSnapshot::empty().with_action_pressed(InputAction::Interact);

        stage.update(&mut session, &talk);
        assert!(session.player.new_quest);
        assert!(session.player.settings.carries("shell_key"));
        assert_eq!(session.cues, vec![SoundCue::QuestGive]);

        stage.update(&mut session, &talk);
        assert!(!session.player.new_quest);
    }

    #[test]
    fn player_lands_on_floor() {
        let game = TestGame::new();
        let mut stage = PlayerStage::new(&game.resources.assets).expect("player");
        let mut session = session_at(&game, 48.0, 80.0);
        for _ in 0..60 {
            stage.update(&mut session, &InputSnapshot::empty());
        }
        assert_eq!(session.player.rect().bottom(), FLOOR_TOP);
        assert!(!session.player.body.jumping);
        assert_eq!(session.flow.requested(), None);
    }

    #[test]
    fn falling_through_gap_requests_restart_once() {
        let game = TestGame::new();
        let mut stage = PlayerStage::new(&game.resources.assets).expect("player");
        let mut session = session_at(&game, 24.0 * 16.0 + 2.0, 80.0);
        for _ in 0..60 {
            stage.update(&mut session, &InputSnapshot::empty());
        }
        assert!(!session.player.alive);
        assert_eq!(session.flow.requested(), Some(StateKey::Game));
    }
}
