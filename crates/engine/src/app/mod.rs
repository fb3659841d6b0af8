mod animation;
mod audio;
mod camera;
mod collision;
mod effects;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod parallax;
mod rendering;
mod state;
mod tilemap;
mod ui;

pub use animation::Animation;
pub use audio::{AudioCommand, AudioSink, RecordingAudio, SharedAudio, SilentAudio};
pub use camera::{Camera, CAMERA_MAX_SCROLL_Y, CAMERA_START_SCROLL};
pub use collision::{
    move_and_collide, resolve_tile_collisions, KinematicBody, COLLISION_NEIGHBOR_RADIUS_TILES,
};
pub use effects::{Expansion, FadeTransition, FadingText};
pub use geometry::{Rect, Vec2};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use parallax::{ParallaxBackground, ParallaxLayer};
pub use rendering::{BitmapFont, Color, FontError, Renderer, Sprite, Surface};
pub use state::{
    AppState, PipelineContext, Stage, StagePipeline, StateBuildError, StateFactory, StateHandoff,
    StateKey, StateMachine, StepOutcome,
};
pub use tilemap::{MapObject, TileCoord, TileLayer, Tilemap, TilemapError};
pub use ui::{Button, ButtonColors};
