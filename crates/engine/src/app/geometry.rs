use std::ops::{Add, AddAssign, Sub, SubAssign};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

/// Axis-aligned rectangle in world units. `y` grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rect of `size` whose bottom edge is centred on `anchor`.
    pub fn from_midbottom(anchor: Vec2, size: Vec2) -> Self {
        Self::new(anchor.x - size.x / 2.0, anchor.y - size.y, size.x, size.y)
    }

    pub fn from_bottomright(anchor: Vec2, size: Vec2) -> Self {
        Self::new(anchor.x - size.x, anchor.y - size.y, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn topleft(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn midbottom(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.bottom())
    }

    pub fn midtop(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.top())
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn set_topleft(&mut self, position: Vec2) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.width;
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.height;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn overlap_area(&self, other: &Rect) -> f32 {
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if width <= 0.0 || height <= 0.0 {
            0.0
        } else {
            width * height
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn partial_overlap_reports_area() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(8.0, 12.0, 16.0, 16.0);
        assert!(a.intersects(&b));
        assert!((a.overlap_area(&b) - 32.0).abs() < 0.0001);
    }

    #[test]
    fn midbottom_anchor_places_rect_above_point() {
        let rect = Rect::from_midbottom(Vec2::new(40.0, 100.0), Vec2::new(10.0, 20.0));
        assert_eq!(rect, Rect::new(35.0, 80.0, 10.0, 20.0));
        assert_eq!(rect.midbottom(), Vec2::new(40.0, 100.0));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut rect = Rect::new(0.0, 0.0, 10.0, 20.0);
        rect.set_right(50.0);
        rect.set_bottom(70.0);
        assert_eq!(rect, Rect::new(40.0, 50.0, 10.0, 20.0));
    }
}
