use engine::{BitmapFont, Color, Rect, Sprite, Surface, Vec2};

pub(crate) const TEXT_COLOR: Color = [255, 255, 255, 255];
const OUTLINE_COLOR: Color = [0, 0, 0, 255];
const BACKDROP_COLOR: Color = [0, 0, 0, 255];
const BACKDROP_PADDING: f32 = 2.0;

/// White text with a one pixel black outline, wrapped at `max_width`.
pub(crate) fn render_outlined(font: &BitmapFont, text: &str, max_width: u32) -> Sprite {
    let outline = font.render_wrapped(text, max_width, OUTLINE_COLOR);
    let fill = font.render_wrapped(text, max_width, TEXT_COLOR);
    let mut canvas = Surface::new(fill.width() + 2, fill.height() + 2);
    for (dx, dy) in [(0.0, 1.0), (2.0, 1.0), (1.0, 0.0), (1.0, 2.0)] {
        canvas.blit(&outline, Vec2::new(dx, dy), 255);
    }
    canvas.blit(&fill, Vec2::new(1.0, 1.0), 255);
    canvas.into_sprite()
}

/// Wrapped text centred above `anchor` (a screen-space midbottom), drawn over
/// a translucent black box.
pub(crate) fn draw_backed(
    surface: &mut Surface,
    label: &Sprite,
    anchor: Vec2,
    text_alpha: u8,
    backdrop_alpha: u8,
) {
    if text_alpha == 0 && backdrop_alpha == 0 {
        return;
    }
    let rect = Rect::from_midbottom(anchor, label.size());
    let backdrop = Rect::new(
        rect.x - BACKDROP_PADDING,
        rect.y - BACKDROP_PADDING,
        rect.width + BACKDROP_PADDING * 2.0,
        rect.height + BACKDROP_PADDING * 2.0,
    );
    surface.fill_rect(backdrop, BACKDROP_COLOR, backdrop_alpha);
    surface.blit(label, rect.topleft(), text_alpha);
}
