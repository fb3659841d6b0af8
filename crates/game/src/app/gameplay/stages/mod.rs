mod actors;
mod control;
mod hud;
mod world;

pub(crate) use actors::{NpcStage, PlayerStage};
pub(crate) use control::{AudioStage, PauseStage};
pub(crate) use hud::{BeachStage, UiStage};
pub(crate) use world::{BackgroundStage, CameraStage, CheckpointStage, TilesStage};

#[cfg(test)]
pub(crate) use hud::{NEW_QUEST, QUEST_FINISHED};
