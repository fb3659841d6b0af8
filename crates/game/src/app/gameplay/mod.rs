mod cards;
mod flow;
mod menu;
mod npc;
mod player;
mod save;
mod session;
mod settings;
mod stages;
#[cfg(test)]
mod test_support;
mod text;

use engine::{
    AppState, AssetError, StagePipeline, StateBuildError, StateFactory, StateHandoff, StateKey,
};
use thiserror::Error;
use tracing::info;

use flow::TransitionStage;
use npc::NpcError;
use player::Player;
use session::PlaySession;
use stages::{
    AudioStage, BackgroundStage, BeachStage, CameraStage, CheckpointStage, NpcStage, PauseStage,
    PlayerStage, TilesStage, UiStage,
};

pub(crate) use save::{SaveError, SaveStore};
pub(crate) use session::GameResources;

#[derive(Debug, Error)]
pub(crate) enum GameBuildError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Npc(#[from] NpcError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Builds a fresh game session from the saved progress. Every fallible
/// stage is built before the soundtrack starts.
pub(crate) fn build_game(
    resources: &GameResources,
    handoff: StateHandoff,
) -> Result<StagePipeline<PlaySession>, GameBuildError> {
    let assets = &resources.assets;
    let settings = resources.saves.load_settings()?;
    let player_size = assets.sprite("player_idle")?.size();

    let background = BackgroundStage::new(assets)?;
    let tiles = TilesStage::new(assets, &resources.tilemap)?;
    let npcs = NpcStage::new(assets, &resources.tilemap)?;
    let player_stage = PlayerStage::new(assets)?;
    let ui = UiStage::new(assets, settings.seashells)?;
    let pause = PauseStage::new(assets, resources.viewport);
    let checkpoints = CheckpointStage::new(&resources.tilemap);

    info!(
        checkpoint = ?settings.checkpoint_pos,
        seashells = settings.seashells,
        music_position_ms = handoff.music_position_ms,
        "game_session_started"
    );
    let session = PlaySession::new(Player::new(player_size, settings), resources, handoff);
    let audio = AudioStage::start(&session);

    Ok(StagePipeline::new("game", session)
        .with_stage(background)
        .with_stage(tiles)
        .with_stage(npcs)
        .with_stage(player_stage)
        .with_stage(checkpoints)
        .with_stage(CameraStage)
        .with_stage(ui)
        .with_stage(BeachStage::default())
        .with_stage(pause)
        .with_stage(audio)
        .with_stage(TransitionStage))
}

/// Builds each state from the resources shared across the whole run.
pub(crate) struct GameFactory {
    resources: GameResources,
}

impl GameFactory {
    pub(crate) fn new(resources: GameResources) -> Self {
        Self { resources }
    }
}

impl StateFactory for GameFactory {
    fn build(
        &mut self,
        key: StateKey,
        handoff: StateHandoff,
    ) -> Result<Box<dyn AppState>, StateBuildError> {
        let resources = &self.resources;
        let built: Result<Box<dyn AppState>, GameBuildError> = match key {
            StateKey::Menu => menu::build_menu(resources, handoff).map(boxed),
            StateKey::Intro => cards::build_intro(resources, handoff).map(boxed),
            StateKey::Game => build_game(resources, handoff).map(boxed),
            StateKey::Credits => cards::build_credits(resources, handoff).map(boxed),
        };
        built.map_err(|err| StateBuildError::new(key, err))
    }
}

fn boxed<S: AppState + 'static>(state: S) -> Box<dyn AppState> {
    Box::new(state)
}

#[cfg(test)]
mod tests {
    use engine::{AudioCommand, InputAction, InputSnapshot, PipelineContext};

    use super::*;
    use crate::app::gameplay::settings::{PlayerSettings, DEFAULT_CHECKPOINT};
    use crate::app::gameplay::stages::{NEW_QUEST, QUEST_FINISHED};
    use crate::app::gameplay::test_support::{TestGame, FLOOR_TOP};

    fn idle() -> InputSnapshot {
        InputSnapshot::empty()
    }

    fn talk() -> InputSnapshot {
        InputSnapshot::empty().with_action_pressed(InputAction::Interact)
    }

    fn settle(game: &mut StagePipeline<PlaySession>) {
        for _ in 0..60 {
            game.run_update(&idle());
        }
        assert_eq!(game.context().player.rect().bottom(), FLOOR_TOP);
    }

    fn teleport(game: &mut StagePipeline<PlaySession>, x: f32) {
        game.context_mut().player.body.rect.x = x;
    }

    fn notice_texts(game: &StagePipeline<PlaySession>) -> Vec<String> {
        game.context()
            .notices
            .iter()
            .map(|notice| notice.text.clone())
            .collect()
    }

    #[test]
    fn stages_run_in_gameplay_order() {
        let test = TestGame::new();
        let game = build_game(&test.resources, StateHandoff::default()).expect("game");
        assert_eq!(
            game.stage_names(),
            vec![
                "background",
                "tiles",
                "npcs",
                "player",
                "checkpoints",
                "camera",
                "ui",
                "beach",
                "pause",
                "audio",
                "transition",
            ]
        );
    }

    #[test]
    fn fetch_quest_plays_out_through_the_pipeline() {
        let test = TestGame::new();
        let mut game = build_game(&test.resources, StateHandoff::default()).expect("game");
        settle(&mut game);

        teleport(&mut game, 100.0);
        game.run_update(&talk());
        assert!(game.context().player.settings.carries("shell_key"));
        assert!(notice_texts(&game).contains(&NEW_QUEST.to_string()));
        assert_eq!(test.audio.borrow().sounds_played("quest_give"), 1);

        teleport(&mut game, 164.0);
        game.run_update(&talk());
        let settings = &game.context().player.settings;
        assert_eq!(settings.seashells, 1);
        assert!(settings.delivered("shell_key"));
        assert!(notice_texts(&game).contains(&QUEST_FINISHED.to_string()));
        assert_eq!(test.audio.borrow().sounds_played("quest_receive"), 1);
    }

    #[test]
    fn death_restarts_game_and_saves_only_after_fade() {
        let test = TestGame::new();
        let mut game = build_game(&test.resources, StateHandoff::default()).expect("game");
        settle(&mut game);

        teleport(&mut game, 24.0 * 16.0 + 2.0);
        let mut frames = 0;
        while game.context().next_state().is_none() {
            game.run_update(&idle());
            if game.context().next_state().is_none() {
                assert_eq!(test.saved_settings(), None);
            }
            frames += 1;
            assert!(frames < 240, "restart never published");
        }
        assert_eq!(game.context().next_state(), Some(StateKey::Game));
        let saved = test.saved_settings().expect("saved on switch");
        assert_eq!(saved.checkpoint_pos, DEFAULT_CHECKPOINT);
        assert_eq!(test.audio.borrow().commands.last(), Some(&AudioCommand::StopMusic));
    }

    #[test]
    fn death_after_checkpoint_saves_the_checkpoint_not_the_fall() {
        let test = TestGame::new();
        let mut game = build_game(&test.resources, StateHandoff::default()).expect("game");
        settle(&mut game);

        teleport(&mut game, 128.0);
        game.run_update(&idle());
        let reached = [128.0, FLOOR_TOP - 16.0];
        assert_eq!(game.context().player.settings.checkpoint_pos, reached);

        teleport(&mut game, 24.0 * 16.0 + 2.0);
        let mut frames = 0;
        while game.context().next_state().is_none() {
            game.run_update(&idle());
            frames += 1;
            assert!(frames < 240, "restart never published");
        }
        assert!(game.context().player.rect().y > FLOOR_TOP);
        let saved = test.saved_settings().expect("saved on switch");
        assert_eq!(saved.checkpoint_pos, reached);
    }

    #[test]
    fn pause_freezes_everything_but_menu_audio_and_fade() {
        let test = TestGame::new();
        let mut game = build_game(&test.resources, StateHandoff::default()).expect("game");
        settle(&mut game);

        game.run_update(&InputSnapshot::empty().with_action_pressed(InputAction::Pause));
        let held = game.context().player.rect();
        let walk = InputSnapshot::empty().with_action_down(InputAction::MoveRight, true);
        game.run_update(&walk);
        game.run_update(&walk);

        assert_eq!(game.last_update_order(), ["pause", "audio", "transition"]);
        assert_eq!(game.context().player.rect(), held);
    }

    #[test]
    fn session_resumes_from_saved_progress() {
        let mut settings = PlayerSettings::default();
        settings.set_checkpoint(160.0, 80.0);
        settings.seashells = 3;
        let test = TestGame::new().with_settings(&settings);
        let game = build_game(
            &test.resources,
            StateHandoff {
                music_position_ms: 5000.0,
            },
        )
        .expect("game");

        assert_eq!(game.context().player.rect().x, 160.0);
        assert_eq!(game.context().player.settings.seashells, 3);
        assert_eq!(
            test.audio.borrow().commands.first(),
            Some(&AudioCommand::PlayMusic {
                track: "ost".to_string(),
                start_ms: 5000.0
            })
        );
    }

    #[test]
    fn factory_builds_every_state() {
        let test = TestGame::new();
        let mut factory = GameFactory::new(test.resources.clone());
        for key in [
            StateKey::Menu,
            StateKey::Intro,
            StateKey::Game,
            StateKey::Credits,
        ] {
            let state = factory
                .build(key, StateHandoff::default())
                .expect("state builds");
            assert!(state.debug_title().is_some());
        }
    }

    #[test]
    fn broken_save_fails_the_build_with_its_key() {
        let test = TestGame::new();
        std::fs::write(test.resources.saves.player_path(), "{ not json").expect("write");
        let mut factory = GameFactory::new(test.resources.clone());
        let err = match factory.build(StateKey::Game, StateHandoff::default()) {
            Ok(_) => panic!("broken save must fail"),
            Err(err) => err,
        };
        assert_eq!(err.key, StateKey::Game);
    }
}
