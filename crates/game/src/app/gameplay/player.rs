use engine::{InputAction, InputSnapshot, KinematicBody, Rect, Vec2};

use super::settings::PlayerSettings;

pub(crate) const PLAYER_SPEED: f32 = 4.0;
pub(crate) const PLAYER_GRAVITY: f32 = 3.5;
pub(crate) const PLAYER_JUMP_IMPULSE: f32 = 15.0;
/// Falling below this line (world y of the rect's top edge) kills the player.
pub(crate) const DEATH_LINE_Y: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Idle,
    Walk,
    Jump,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    pub(crate) body: KinematicBody,
    pub(crate) state: PlayerState,
    pub(crate) facing: Facing,
    pub(crate) alive: bool,
    pub(crate) settings: PlayerSettings,
    /// Raised by a quest-giver for the frame a quest is handed out.
    pub(crate) new_quest: bool,
}

impl Player {
    pub(crate) fn new(size: Vec2, settings: PlayerSettings) -> Self {
        let [x, y] = settings.checkpoint_pos;
        Self {
            body: KinematicBody::new(Rect::new(x, y, size.x, size.y)),
            state: PlayerState::Idle,
            facing: Facing::Right,
            alive: true,
            settings,
            new_quest: false,
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        self.body.rect
    }

    /// Re-derives state and velocity from held keys and the jump edge.
    pub(crate) fn control(&mut self, input: &InputSnapshot) {
        self.state = PlayerState::Idle;
        self.body.vel.x = 0.0;

        let left = input.is_down(InputAction::MoveLeft);
        let right = input.is_down(InputAction::MoveRight);
        if right && !left {
            self.state = PlayerState::Walk;
            self.facing = Facing::Right;
            self.body.vel.x = PLAYER_SPEED;
        } else if left && !right {
            self.state = PlayerState::Walk;
            self.facing = Facing::Left;
            self.body.vel.x = -PLAYER_SPEED;
        }

        self.body.vel.y += PLAYER_GRAVITY * input.dt();

        if input.was_pressed(InputAction::Jump) && !self.body.jumping {
            self.body.jumping = true;
            self.body.vel.y = -PLAYER_JUMP_IMPULSE;
        }

        if self.body.jumping {
            self.state = PlayerState::Jump;
        }
    }

    /// Returns true on the frame the player crosses the death line.
    pub(crate) fn check_death(&mut self) -> bool {
        if self.alive && self.body.rect.y > DEATH_LINE_Y {
            self.alive = false;
            return true;
        }
        false
    }
}
