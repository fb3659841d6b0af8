use crate::app::{Rect, Vec2};

pub type Color = [u8; 4];

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Sprite {
    /// Returns `None` when the buffer does not hold `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }

    pub fn flipped_horizontal(&self) -> Self {
        let row_len = self.width as usize * 4;
        let mut rgba = Vec::with_capacity(self.rgba.len());
        for row in self.rgba.chunks_exact(row_len.max(1)) {
            for pixel in row.chunks_exact(4).rev() {
                rgba.extend_from_slice(pixel);
            }
        }
        Self {
            width: self.width,
            height: self.height,
            rgba,
        }
    }

    /// Copies a sub-rectangle; cells outside the image come back transparent.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let mut rgba = vec![0u8; width as usize * height as usize * 4];
        for dy in 0..height {
            for dx in 0..width {
                if let Some(color) = self.pixel(x + dx, y + dy) {
                    let offset = (dy as usize * width as usize + dx as usize) * 4;
                    rgba[offset..offset + 4].copy_from_slice(&color);
                }
            }
        }
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Splits a horizontal strip into frames of `frame_width`.
    pub fn split_strip(&self, frame_width: u32) -> Vec<Sprite> {
        if frame_width == 0 || frame_width >= self.width {
            return vec![self.clone()];
        }
        (0..self.width / frame_width)
            .map(|index| self.region(index * frame_width, 0, frame_width, self.height))
            .collect()
    }
}

/// Software framebuffer every stage draws into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }

    /// Freezes a composed surface into a sprite, keeping its alpha channel.
    pub fn into_sprite(self) -> Sprite {
        Sprite {
            width: self.width,
            height: self.height,
            rgba: self.rgba,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }

    pub fn clear(&mut self, color: Color) {
        for pixel in self.rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        let left = rect.x.floor() as i32;
        let top = rect.y.floor() as i32;
        let right = (rect.x + rect.width).floor() as i32;
        let bottom = (rect.y + rect.height).floor() as i32;
        for y in top.max(0)..bottom.min(self.height as i32) {
            for x in left.max(0)..right.min(self.width as i32) {
                self.blend_pixel(x as usize, y as usize, color, alpha);
            }
        }
    }

    pub fn fill(&mut self, color: Color, alpha: u8) {
        let rect = Rect::new(0.0, 0.0, self.width as f32, self.height as f32);
        self.fill_rect(rect, color, alpha);
    }

    pub fn blit(&mut self, sprite: &Sprite, position: Vec2, alpha: u8) {
        self.blit_rgba(
            &sprite.rgba,
            sprite.width,
            sprite.height,
            position,
            alpha,
        );
    }

    pub fn blit_surface(&mut self, source: &Surface, position: Vec2) {
        self.blit_rgba(&source.rgba, source.width, source.height, position, 255);
    }

    fn blit_rgba(&mut self, rgba: &[u8], width: u32, height: u32, position: Vec2, alpha: u8) {
        if alpha == 0 || width == 0 || height == 0 {
            return;
        }
        let left = position.x.floor() as i32;
        let top = position.y.floor() as i32;
        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = (left + width as i32).min(self.width as i32);
        let draw_bottom = (top + height as i32).min(self.height as i32);
        for y in draw_top..draw_bottom {
            let src_y = (y - top) as usize;
            for x in draw_left..draw_right {
                let src_x = (x - left) as usize;
                let offset = (src_y * width as usize + src_x) * 4;
                let src = [
                    rgba[offset],
                    rgba[offset + 1],
                    rgba[offset + 2],
                    rgba[offset + 3],
                ];
                let combined = (src[3] as u16 * alpha as u16 / 255) as u8;
                if combined == 0 {
                    continue;
                }
                self.blend_pixel(x as usize, y as usize, src, combined);
            }
        }
    }

    fn blend_pixel(&mut self, x: usize, y: usize, color: Color, alpha: u8) {
        let offset = (y * self.width as usize + x) * 4;
        let dst = &mut self.rgba[offset..offset + 4];
        if alpha == 255 {
            dst[..3].copy_from_slice(&color[..3]);
            dst[3] = 255;
            return;
        }
        let a = alpha as u16;
        for channel in 0..3 {
            dst[channel] =
                ((color[channel] as u16 * a + dst[channel] as u16 * (255 - a)) / 255) as u8;
        }
        dst[3] = dst[3].max(alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    #[test]
    fn blit_clips_to_surface_bounds() {
        let mut surface = Surface::new(4, 4);
        let sprite = Sprite::solid(3, 3, RED);
        surface.blit(&sprite, Vec2::new(-1.0, 2.0), 255);

        assert_eq!(surface.pixel(0, 2), Some(RED));
        assert_eq!(surface.pixel(1, 3), Some(RED));
        assert_eq!(surface.pixel(2, 2), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(0, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn half_alpha_fill_blends_toward_color() {
        let mut surface = Surface::new(1, 1);
        surface.clear([0, 0, 0, 255]);
        surface.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), [255, 255, 255, 255], 128);
        let pixel = surface.pixel(0, 0).expect("pixel");
        assert_eq!(pixel[0], 128);
    }

    #[test]
    fn flip_mirrors_columns() {
        let mut rgba = vec![0u8; 2 * 4];
        rgba[..4].copy_from_slice(&RED);
        let sprite = Sprite::from_rgba(2, 1, rgba).expect("sprite");
        let flipped = sprite.flipped_horizontal();
        assert_eq!(flipped.pixel(1, 0), Some(RED));
        assert_eq!(flipped.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn strip_splits_into_equal_frames() {
        let strip = Sprite::solid(48, 16, RED);
        let frames = strip.split_strip(16);
        assert_eq!(frames.len(), 3);
        assert!(frames.iter().all(|frame| frame.width() == 16));
    }

    #[test]
    fn from_rgba_rejects_short_buffers() {
        assert!(Sprite::from_rgba(2, 2, vec![0; 12]).is_none());
    }
}
