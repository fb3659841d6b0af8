use super::{BitmapFont, Color, InputSnapshot, Rect, Sprite, Surface, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonColors {
    pub idle: Color,
    pub hover: Color,
    pub text: Color,
}

/// Screen-space push button. `clicked` is true only on the update that saw a
/// left-click edge while the cursor was over it.
#[derive(Debug, Clone)]
pub struct Button {
    pub label: &'static str,
    rect: Rect,
    colors: ButtonColors,
    label_sprite: Sprite,
    hovered: bool,
    clicked: bool,
}

impl Button {
    pub fn new(label: &'static str, rect: Rect, colors: ButtonColors, font: &BitmapFont) -> Self {
        Self {
            label,
            rect,
            colors,
            label_sprite: font.render(label, colors.text),
            hovered: false,
            clicked: false,
        }
    }

    /// Stacks buttons upward from the bottom-right corner of the viewport.
    pub fn column(
        labels: &[&'static str],
        viewport: (u32, u32),
        size: Vec2,
        colors: ButtonColors,
        font: &BitmapFont,
    ) -> Vec<Self> {
        labels
            .iter()
            .enumerate()
            .map(|(index, label)| {
                let step = (index + 1) as f32;
                let rect = Rect::new(
                    viewport.0 as f32 - size.x - 10.0,
                    viewport.1 as f32 - size.y * step - 5.0 * step,
                    size.x,
                    size.y,
                );
                Self::new(label, rect, colors, font)
            })
            .collect()
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn clicked(&self) -> bool {
        self.clicked
    }

    pub fn update(&mut self, input: &InputSnapshot) {
        self.hovered = input
            .cursor_position_px()
            .is_some_and(|cursor| self.rect.contains_point(cursor));
        self.clicked = self.hovered && input.left_click_pressed();
    }

    pub fn draw(&self, surface: &mut Surface) {
        let fill = if self.hovered {
            self.colors.hover
        } else {
            self.colors.idle
        };
        surface.fill_rect(self.rect, fill, 255);
        let label_pos = Vec2::new(
            self.rect.center_x() - self.label_sprite.width() as f32 / 2.0,
            self.rect.center_y() - self.label_sprite.height() as f32 / 2.0,
        );
        surface.blit(&self.label_sprite, label_pos, 255);
    }
}
