use super::{Rect, Vec2};

pub const CAMERA_START_SCROLL: Vec2 = Vec2 { x: 0.0, y: -48.0 };
pub const CAMERA_MAX_SCROLL_Y: f32 = 48.0;

/// Scroll offset between world and screen space.
///
/// The horizontal chase is a whole-pixel step per call and ignores `dt`;
/// only the vertical chase is scaled by `dt`. Both are kept as-is pending a
/// product decision on unifying them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    width: u32,
    height: u32,
    scroll: Vec2,
    max_scroll_y: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scroll: CAMERA_START_SCROLL,
            max_scroll_y: CAMERA_MAX_SCROLL_Y,
        }
    }

    pub fn with_max_scroll_y(mut self, max_scroll_y: f32) -> Self {
        self.max_scroll_y = max_scroll_y;
        self.scroll.y = self.scroll.y.min(max_scroll_y);
        self
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    pub fn max_scroll_y(&self) -> f32 {
        self.max_scroll_y
    }

    pub fn apply(&self, target: Vec2) -> Vec2 {
        target - self.scroll
    }

    pub fn apply_rect(&self, target: &Rect) -> Vec2 {
        self.apply(target.topleft())
    }

    pub fn adjust_to(&mut self, dt: f32, target: Vec2) {
        let half_width = (self.width / 2) as f32;
        let anchor_height = (self.height as f32 / 1.5).floor();

        self.scroll.x += (target.x - self.scroll.x - half_width).floor();
        self.scroll.y += (target.y - self.scroll.y - anchor_height).floor() * dt;
        self.scroll.y = self.scroll.y.min(self.max_scroll_y);
    }
}
