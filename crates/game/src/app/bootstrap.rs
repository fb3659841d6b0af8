use std::rc::Rc;

use engine::{
    load_tmx, resolve_app_paths, AssetError, AssetStore, LoopConfig, SilentAudio, StartupError,
    StateBuildError, StateKey, StateMachine, TmxError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{GameFactory, GameResources, SaveError, SaveStore};

pub(crate) const INITIAL_STATE: StateKey = StateKey::Menu;

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Paths(#[from] StartupError),
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Map(#[from] TmxError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    State(#[from] StateBuildError),
}

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) machine: StateMachine,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Seashore Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        saves = %paths.saves_dir.display(),
        "paths_resolved"
    );
    let assets = AssetStore::load(&paths.assets_dir)?;
    let tilemap = load_tmx(&paths.map_path())?;

    // A malformed save stops startup here rather than on the first switch.
    let saves = SaveStore::new(&paths.saves_dir);
    let settings = saves.load_settings()?;
    let flags = saves.load_flags()?;
    info!(
        seashells = settings.seashells,
        run_intro = flags.run_intro,
        game_complete = flags.game_complete,
        "saves_loaded"
    );

    let audio = SilentAudio::new(
        assets
            .sound_names()
            .iter()
            .chain(assets.music_names())
            .cloned(),
    )
    .shared();
    let config = LoopConfig::default();
    let resources = GameResources {
        assets: Rc::new(assets),
        tilemap: Rc::new(tilemap),
        audio,
        saves,
        viewport: (config.logical_width, config.logical_height),
    };
    let machine = StateMachine::new(Box::new(GameFactory::new(resources)), INITIAL_STATE)?;

    Ok(AppWiring { config, machine })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
