mod font;
mod renderer;
mod surface;

pub use font::{BitmapFont, FontError};
pub use renderer::Renderer;
pub use surface::{Color, Sprite, Surface};
