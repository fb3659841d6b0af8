use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::Surface;

/// Presents the logical-resolution framebuffer, scaled to the window by
/// `pixels`.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    logical_width: u32,
    logical_height: u32,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        logical_width: u32,
        logical_height: u32,
    ) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            (size.width, size.height),
            (logical_width, logical_height),
        )?;
        Ok(Self {
            window,
            pixels,
            logical_width,
            logical_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            (width, height),
            (self.logical_width, self.logical_height),
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        window_size: (u32, u32),
        logical_size: (u32, u32),
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(window_size.0, window_size.1, window);
        Pixels::new(logical_size.0, logical_size.1, surface)
    }

    /// Maps a window-space cursor position into logical pixels.
    pub fn window_to_logical(&self, x: f32, y: f32) -> Option<(f32, f32)> {
        self.pixels
            .window_pos_to_pixel((x, y))
            .ok()
            .map(|(px, py)| (px as f32, py as f32))
    }

    pub fn present(&mut self, surface: &Surface) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        let source = surface.as_bytes();
        if frame.len() == source.len() {
            frame.copy_from_slice(source);
        }
        self.pixels.render()
    }
}
