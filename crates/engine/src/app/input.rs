use super::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    Jump,
    Interact,
    Pause,
}

const ACTION_COUNT: usize = 5;

/// Per-action held state plus the number of key-down edges since the last
/// snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
    pressed: [u8; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        let index = action.index();
        if is_down && !self.down[index] {
            self.pressed[index] = self.pressed[index].saturating_add(1);
        }
        self.down[index] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn pressed_count(&self, action: InputAction) -> u8 {
        self.pressed[action.index()]
    }

    pub(crate) fn clear_edges(&mut self) {
        self.pressed = [0; ACTION_COUNT];
    }

    fn push_edge(&mut self, action: InputAction) {
        let index = action.index();
        self.pressed[index] = self.pressed[index].saturating_add(1);
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::Jump => 2,
            InputAction::Interact => 3,
            InputAction::Pause => 4,
        }
    }
}

/// Everything a stage may read about one simulation step.
#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot {
    actions: ActionStates,
    dt: f32,
    cursor_position_px: Option<Vec2>,
    left_click_pressed: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            actions: ActionStates::default(),
            dt: 1.0,
            cursor_position_px: None,
            left_click_pressed: false,
        }
    }
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        dt: f32,
        cursor_position_px: Option<Vec2>,
        left_click_pressed: bool,
    ) -> Self {
        Self {
            actions,
            dt,
            cursor_position_px,
            left_click_pressed,
        }
    }

    /// Frame delta scaled so that one reference frame is `1.0`.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn pressed_count(&self, action: InputAction) -> u8 {
        self.actions.pressed_count(action)
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.pressed_count(action) > 0
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    /// Sets the held state without recording a key-down edge.
    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        let pressed = self.actions.pressed;
        self.actions.set(action, is_down);
        self.actions.pressed = pressed;
        self
    }

    /// Records one key-down edge and marks the action held.
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.push_edge(action);
        self.actions.down[action.index()] = true;
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }
}
