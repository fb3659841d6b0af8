use engine::{Color, FadeTransition, InputSnapshot, Stage, StateKey, Surface};
use tracing::info;

pub(crate) const FADE_SPEED: f32 = 6.0;
const FADE_COLOR: Color = [0, 0, 0, 255];

/// The two-step state switch: a stage *requests* a state, and only once the
/// fade-out finishes does the transition stage *publish* it for the loop.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StateFlow {
    pub(crate) transition: FadeTransition,
    requested: Option<StateKey>,
    next: Option<StateKey>,
    exit: bool,
}

impl Default for StateFlow {
    fn default() -> Self {
        Self {
            transition: FadeTransition::new(true, FADE_SPEED),
            requested: None,
            next: None,
            exit: false,
        }
    }
}

impl StateFlow {
    /// The first request in a session wins.
    pub(crate) fn request(&mut self, key: StateKey) {
        if self.requested.is_some() {
            return;
        }
        info!(state = ?key, "state_requested");
        self.requested = Some(key);
    }

    pub(crate) fn requested(&self) -> Option<StateKey> {
        self.requested
    }

    pub(crate) fn request_exit(&mut self) {
        info!("exit_requested");
        self.exit = true;
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit
    }

    pub(crate) fn next(&self) -> Option<StateKey> {
        self.next
    }

    /// Advances the fade. Returns the requested state on the update that
    /// completes the fade-out; the caller runs its save point and then calls
    /// [`StateFlow::publish`].
    pub(crate) fn advance(&mut self, dt: f32) -> Option<StateKey> {
        if self.requested.is_some() {
            self.transition.fade_in = false;
        }
        self.transition.update(dt);
        match self.requested {
            Some(key) if self.next.is_none() && self.transition.event() => Some(key),
            _ => None,
        }
    }

    pub(crate) fn publish(&mut self, key: StateKey) {
        info!(state = ?key, "transition_completed");
        self.next = Some(key);
    }
}

/// A pipeline context that switches states through a [`StateFlow`].
pub(crate) trait FlowContext {
    fn flow(&self) -> &StateFlow;
    fn flow_mut(&mut self) -> &mut StateFlow;
    /// Save point: runs once, after the fade-out and before `next` is published.
    fn before_switch(&mut self, next: StateKey);
}

/// Last stage of every pipeline. Drives the fade and draws it over
/// everything else.
pub(crate) struct TransitionStage;

impl<S: FlowContext> Stage<S> for TransitionStage {
    fn name(&self) -> &'static str {
        "transition"
    }

    fn update(&mut self, context: &mut S, input: &InputSnapshot) {
        if let Some(next) = context.flow_mut().advance(input.dt()) {
            context.before_switch(next);
            context.flow_mut().publish(next);
        }
    }

    fn draw(&mut self, context: &S, surface: &mut Surface, _input: &InputSnapshot) {
        surface.fill(FADE_COLOR, context.flow().transition.alpha());
    }

    fn runs_while_frozen(&self) -> bool {
        true
    }
}
