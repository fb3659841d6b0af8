use thiserror::Error;

use super::{Color, Sprite};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    #[error("glyph size must be non-zero, got {width}x{height}")]
    ZeroGlyphSize { width: u32, height: u32 },
    #[error("glyph sheet {sheet_width}x{sheet_height} holds no {width}x{height} glyphs")]
    SheetTooSmall {
        sheet_width: u32,
        sheet_height: u32,
        width: u32,
        height: u32,
    },
}

/// Fixed-cell glyph sheet. Cells are laid out left-to-right, top-to-bottom,
/// starting at `first_char`; the sheet's alpha channel is the glyph mask.
#[derive(Debug, Clone)]
pub struct BitmapFont {
    sheet: Sprite,
    glyph_width: u32,
    glyph_height: u32,
    first_char: u32,
    columns: u32,
    glyph_count: u32,
}

impl BitmapFont {
    pub fn new(
        sheet: Sprite,
        glyph_width: u32,
        glyph_height: u32,
        first_char: char,
    ) -> Result<Self, FontError> {
        if glyph_width == 0 || glyph_height == 0 {
            return Err(FontError::ZeroGlyphSize {
                width: glyph_width,
                height: glyph_height,
            });
        }
        let columns = sheet.width() / glyph_width;
        let rows = sheet.height() / glyph_height;
        if columns == 0 || rows == 0 {
            return Err(FontError::SheetTooSmall {
                sheet_width: sheet.width(),
                sheet_height: sheet.height(),
                width: glyph_width,
                height: glyph_height,
            });
        }
        Ok(Self {
            sheet,
            glyph_width,
            glyph_height,
            first_char: first_char as u32,
            columns,
            glyph_count: columns * rows,
        })
    }

    /// Glyph height plus a one-pixel gap between lines.
    pub fn line_height(&self) -> u32 {
        self.glyph_height + 1
    }

    pub fn measure(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.glyph_width
    }

    /// Greedy word wrap; a single word wider than `max_width` gets its own line.
    pub fn wrap(&self, text: &str, max_width: u32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if self.measure(&candidate) > max_width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current = word.to_string();
                } else {
                    current = candidate;
                }
            }
            lines.push(current);
        }
        lines
    }

    pub fn render(&self, text: &str, color: Color) -> Sprite {
        self.render_wrapped(text, u32::MAX, color)
    }

    pub fn render_wrapped(&self, text: &str, max_width: u32, color: Color) -> Sprite {
        let lines = self.wrap(text, max_width);
        let width = lines
            .iter()
            .map(|line| self.measure(line))
            .max()
            .unwrap_or(0)
            .max(1);
        let height = (lines.len() as u32 * self.line_height()).max(1);
        let mut rgba = vec![0u8; width as usize * height as usize * 4];

        for (row, line) in lines.iter().enumerate() {
            let top = row as u32 * self.line_height();
            for (column, ch) in line.chars().enumerate() {
                let Some((cell_x, cell_y)) = self.cell_of(ch) else {
                    continue;
                };
                let left = column as u32 * self.glyph_width;
                for gy in 0..self.glyph_height {
                    for gx in 0..self.glyph_width {
                        let Some(mask) = self.sheet.pixel(cell_x + gx, cell_y + gy) else {
                            continue;
                        };
                        if mask[3] == 0 {
                            continue;
                        }
                        let offset = (((top + gy) * width + left + gx) as usize) * 4;
                        rgba[offset..offset + 3].copy_from_slice(&color[..3]);
                        rgba[offset + 3] = (mask[3] as u16 * color[3] as u16 / 255) as u8;
                    }
                }
            }
        }
        Sprite::from_rgba(width, height, rgba).unwrap_or_else(|| Sprite::solid(1, 1, [0; 4]))
    }

    fn cell_of(&self, ch: char) -> Option<(u32, u32)> {
        let index = (ch as u32).checked_sub(self.first_char)?;
        if index >= self.glyph_count {
            return None;
        }
        Some((
            (index % self.columns) * self.glyph_width,
            (index / self.columns) * self.glyph_height,
        ))
    }
}
