use std::rc::Rc;

use super::{Sprite, Surface, Vec2};

/// Looping frame set. `speed` is frames advanced per reference frame.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Rc<[Sprite]>,
    speed: f32,
    cursor: f32,
}

impl Animation {
    pub fn new(frames: Rc<[Sprite]>, speed: f32) -> Self {
        Self {
            frames,
            speed,
            cursor: 0.0,
        }
    }

    pub fn mirrored(&self) -> Self {
        let frames: Vec<Sprite> = self.frames.iter().map(Sprite::flipped_horizontal).collect();
        Self {
            frames: frames.into(),
            speed: self.speed,
            cursor: 0.0,
        }
    }

    pub fn frame_index(&self) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        (self.cursor.floor() as usize) % self.frames.len()
    }

    pub fn current(&self) -> Option<&Sprite> {
        self.frames.get(self.frame_index())
    }

    pub fn advance(&mut self, dt: f32) {
        if self.frames.is_empty() {
            return;
        }
        self.cursor = (self.cursor + self.speed * dt) % self.frames.len() as f32;
    }

    pub fn play(&mut self, surface: &mut Surface, position: Vec2, dt: f32) {
        if let Some(frame) = self.current() {
            surface.blit(frame, position, 255);
        }
        self.advance(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Rc<[Sprite]> {
        (0..count)
            .map(|index| Sprite::solid(1, 1, [index as u8, 0, 0, 255]))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn advance_wraps_around_frame_count() {
        let mut animation = Animation::new(frames(3), 0.8);
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(animation.frame_index());
            animation.advance(1.0);
        }
        assert_eq!(seen, vec![0, 0, 1, 2, 0]);
    }

    #[test]
    fn zero_speed_holds_first_frame() {
        let mut animation = Animation::new(frames(2), 0.0);
        animation.advance(10.0);
        assert_eq!(animation.frame_index(), 0);
    }
}
