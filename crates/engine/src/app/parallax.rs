use super::{Sprite, Surface, Vec2};

#[derive(Debug, Clone)]
pub struct ParallaxLayer {
    pub sprite: Sprite,
    /// Fraction of the camera scroll this layer moves by.
    pub factor: f32,
}

/// Horizontally repeating background layers drawn back to front.
#[derive(Debug, Clone, Default)]
pub struct ParallaxBackground {
    layers: Vec<ParallaxLayer>,
}

impl ParallaxBackground {
    pub fn new(layers: Vec<ParallaxLayer>) -> Self {
        Self { layers }
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_offset(layer: &ParallaxLayer, scroll: Vec2) -> f32 {
        let width = layer.sprite.width().max(1) as f32;
        -(scroll.x * layer.factor).rem_euclid(width)
    }

    pub fn draw(&self, surface: &mut Surface, scroll: Vec2) {
        for layer in &self.layers {
            let width = layer.sprite.width();
            if width == 0 {
                continue;
            }
            let mut x = Self::layer_offset(layer, scroll);
            while x < surface.width() as f32 {
                surface.blit(&layer.sprite, Vec2::new(x, 0.0), 255);
                x += width as f32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_wraps_within_layer_width() {
        let layer = ParallaxLayer {
            sprite: Sprite::solid(100, 10, [1, 2, 3, 255]),
            factor: 0.5,
        };
        assert_eq!(ParallaxBackground::layer_offset(&layer, Vec2::new(0.0, 0.0)), 0.0);
        assert_eq!(ParallaxBackground::layer_offset(&layer, Vec2::new(60.0, 0.0)), -30.0);
        assert_eq!(ParallaxBackground::layer_offset(&layer, Vec2::new(260.0, 0.0)), -30.0);
        assert_eq!(ParallaxBackground::layer_offset(&layer, Vec2::new(-60.0, 0.0)), -70.0);
    }

    #[test]
    fn draw_covers_full_surface_width() {
        let background = ParallaxBackground::new(vec![ParallaxLayer {
            sprite: Sprite::solid(7, 4, [200, 0, 0, 255]),
            factor: 1.0,
        }]);
        let mut surface = Surface::new(20, 4);
        background.draw(&mut surface, Vec2::new(3.0, 0.0));
        for x in 0..20 {
            assert_eq!(surface.pixel(x, 0), Some([200, 0, 0, 255]), "x={x}");
        }
    }
}
