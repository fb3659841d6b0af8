use std::error::Error as StdError;

use thiserror::Error;
use tracing::info;

use super::{InputSnapshot, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    Intro,
    Menu,
    Game,
    Credits,
}

/// Values carried from a state that is being torn down into the next one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateHandoff {
    pub music_position_ms: f64,
}

/// What the application loop drives. `next_state` becoming `Some` tells the
/// loop to drop this state and build the named one.
pub trait AppState {
    fn update(&mut self, input: &InputSnapshot);
    fn draw(&mut self, surface: &mut Surface, input: &InputSnapshot);
    fn next_state(&self) -> Option<StateKey>;
    fn exit_requested(&self) -> bool;
    fn handoff(&self) -> StateHandoff {
        StateHandoff::default()
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Shared data threaded through every stage of one pipeline.
pub trait PipelineContext {
    fn is_frozen(&self) -> bool {
        false
    }
    fn next_state(&self) -> Option<StateKey>;
    fn exit_requested(&self) -> bool;
    fn handoff(&self) -> StateHandoff {
        StateHandoff::default()
    }
}

pub trait Stage<S> {
    fn name(&self) -> &'static str;
    fn update(&mut self, context: &mut S, input: &InputSnapshot);
    fn draw(&mut self, _context: &S, _surface: &mut Surface, _input: &InputSnapshot) {}
    /// Stages that keep running while the context reports itself frozen.
    fn runs_while_frozen(&self) -> bool {
        false
    }
}

/// Ordered list of stages sharing one context. `update` and `draw` walk the
/// list in the same order, so later stages see what earlier ones changed and
/// draw on top of them.
pub struct StagePipeline<S> {
    name: &'static str,
    context: S,
    stages: Vec<Box<dyn Stage<S>>>,
    last_update_order: Vec<&'static str>,
}

impl<S: PipelineContext> StagePipeline<S> {
    pub fn new(name: &'static str, context: S) -> Self {
        Self {
            name,
            context,
            stages: Vec::new(),
            last_update_order: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage<S> + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn context(&self) -> &S {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut S {
        &mut self.context
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn last_update_order(&self) -> &[&'static str] {
        &self.last_update_order
    }

    pub fn run_update(&mut self, input: &InputSnapshot) {
        self.last_update_order.clear();
        for stage in &mut self.stages {
            if self.context.is_frozen() && !stage.runs_while_frozen() {
                continue;
            }
            self.last_update_order.push(stage.name());
            stage.update(&mut self.context, input);
        }
    }

    pub fn run_draw(&mut self, surface: &mut Surface, input: &InputSnapshot) {
        for stage in &mut self.stages {
            stage.draw(&self.context, surface, input);
        }
    }
}

impl<S: PipelineContext> AppState for StagePipeline<S> {
    fn update(&mut self, input: &InputSnapshot) {
        self.run_update(input);
    }

    fn draw(&mut self, surface: &mut Surface, input: &InputSnapshot) {
        self.run_draw(surface, input);
    }

    fn next_state(&self) -> Option<StateKey> {
        self.context.next_state()
    }

    fn exit_requested(&self) -> bool {
        self.context.exit_requested()
    }

    fn handoff(&self) -> StateHandoff {
        self.context.handoff()
    }

    fn debug_title(&self) -> Option<String> {
        Some(self.name.to_string())
    }
}

#[derive(Debug, Error)]
#[error("failed to build state {key:?}: {source}")]
pub struct StateBuildError {
    pub key: StateKey,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

impl StateBuildError {
    pub fn new(key: StateKey, source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self {
            key,
            source: source.into(),
        }
    }
}

pub trait StateFactory {
    fn build(
        &mut self,
        key: StateKey,
        handoff: StateHandoff,
    ) -> Result<Box<dyn AppState>, StateBuildError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Switched(StateKey),
    Exit,
}

/// Owns the active state and swaps it for a freshly built one whenever it
/// publishes a next state.
pub struct StateMachine {
    factory: Box<dyn StateFactory>,
    active: Box<dyn AppState>,
    active_key: StateKey,
}

impl StateMachine {
    pub fn new(
        mut factory: Box<dyn StateFactory>,
        initial: StateKey,
    ) -> Result<Self, StateBuildError> {
        let active = factory.build(initial, StateHandoff::default())?;
        info!(state = ?initial, "state_entered");
        Ok(Self {
            factory,
            active,
            active_key: initial,
        })
    }

    pub fn active_key(&self) -> StateKey {
        self.active_key
    }

    pub fn debug_title(&self) -> Option<String> {
        self.active.debug_title()
    }

    pub fn update(&mut self, input: &InputSnapshot) -> Result<StepOutcome, StateBuildError> {
        self.active.update(input);
        if self.active.exit_requested() {
            info!(state = ?self.active_key, "exit_requested");
            return Ok(StepOutcome::Exit);
        }
        let Some(next) = self.active.next_state() else {
            return Ok(StepOutcome::Continue);
        };
        let handoff = self.active.handoff();
        self.active = self.factory.build(next, handoff)?;
        info!(from = ?self.active_key, to = ?next, "state_switched");
        self.active_key = next;
        Ok(StepOutcome::Switched(next))
    }

    pub fn draw(&mut self, surface: &mut Surface, input: &InputSnapshot) {
        self.active.draw(surface, input);
    }
}
