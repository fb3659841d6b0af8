use std::collections::HashMap;

use thiserror::Error;

use super::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub name: String,
    pub solid: bool,
    /// Row-major global tile ids; `0` is an empty cell.
    pub gids: Vec<u32>,
}

/// Placement record from a named object layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub name: String,
    pub kind: String,
    pub rect: Rect,
    pub properties: HashMap<String, String>,
}

impl MapObject {
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("layer '{layer}' tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },
    #[error("tile size must be non-zero, got {width}x{height}")]
    ZeroTileSize { width: u32, height: u32 },
}

/// Immutable per-level tile grid. Tile (0,0) has its top-left corner at the
/// world origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    layers: Vec<TileLayer>,
    solid: Vec<bool>,
    object_layers: HashMap<String, Vec<MapObject>>,
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size: (u32, u32),
        layers: Vec<TileLayer>,
        object_layers: HashMap<String, Vec<MapObject>>,
    ) -> Result<Self, TilemapError> {
        let (tile_width, tile_height) = tile_size;
        if tile_width == 0 || tile_height == 0 {
            return Err(TilemapError::ZeroTileSize {
                width: tile_width,
                height: tile_height,
            });
        }
        let expected = width as usize * height as usize;
        let mut solid = vec![false; expected];
        for layer in &layers {
            if layer.gids.len() != expected {
                return Err(TilemapError::TileCountMismatch {
                    layer: layer.name.clone(),
                    expected,
                    actual: layer.gids.len(),
                });
            }
            if !layer.solid {
                continue;
            }
            for (cell, gid) in solid.iter_mut().zip(&layer.gids) {
                *cell |= *gid != 0;
            }
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            layers,
            solid,
            object_layers,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.width * self.tile_width, self.height * self.tile_height)
    }

    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    pub fn object_layer(&self, name: &str) -> &[MapObject] {
        self.object_layers
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_solid(&self, coord: TileCoord) -> bool {
        self.index_of(coord)
            .and_then(|index| self.solid.get(index).copied())
            .unwrap_or(false)
    }

    pub fn pixel_to_tile(&self, position: Vec2) -> TileCoord {
        TileCoord {
            x: (position.x / self.tile_width as f32).floor() as i32,
            y: (position.y / self.tile_height as f32).floor() as i32,
        }
    }

    pub fn tile_rect(&self, coord: TileCoord) -> Rect {
        Rect::new(
            coord.x as f32 * self.tile_width as f32,
            coord.y as f32 * self.tile_height as f32,
            self.tile_width as f32,
            self.tile_height as f32,
        )
    }

    /// Solid tile rects in the inclusive square of `radius` tiles around
    /// `center`. Cells outside the map are never solid.
    pub fn tiles_near(&self, center: TileCoord, radius: i32) -> Vec<Rect> {
        let radius = radius.max(0);
        let mut tiles = Vec::new();
        for y in (center.y - radius)..=(center.y + radius) {
            for x in (center.x - radius)..=(center.x + radius) {
                let coord = TileCoord { x, y };
                if self.is_solid(coord) {
                    tiles.push(self.tile_rect(coord));
                }
            }
        }
        tiles
    }

    fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        let (x, y) = (coord.x as u32, coord.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(name: &str, solid: bool, gids: Vec<u32>) -> TileLayer {
        TileLayer {
            name: name.to_string(),
            solid,
            gids,
        }
    }

    #[test]
    fn rejects_layer_with_wrong_cell_count() {
        let error = Tilemap::new(
            2,
            2,
            (16, 16),
            vec![layer("ground", true, vec![1, 1, 1])],
            HashMap::new(),
        )
        .expect_err("shape mismatch");
        assert_eq!(
            error,
            TilemapError::TileCountMismatch {
                layer: "ground".to_string(),
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn decoration_layers_are_not_solid() {
        let map = Tilemap::new(
            2,
            1,
            (16, 16),
            vec![
                layer("ground", true, vec![1, 0]),
                layer("decor", false, vec![0, 5]),
            ],
            HashMap::new(),
        )
        .expect("tilemap");
        assert!(map.is_solid(TileCoord { x: 0, y: 0 }));
        assert!(!map.is_solid(TileCoord { x: 1, y: 0 }));
    }

    #[test]
    fn neighbor_query_is_bounded_by_radius() {
        let width = 10u32;
        let height = 10u32;
        let map = Tilemap::new(
            width,
            height,
            (16, 16),
            vec![layer("ground", true, vec![1; (width * height) as usize])],
            HashMap::new(),
        )
        .expect("tilemap");

        let tiles = map.tiles_near(TileCoord { x: 5, y: 5 }, 3);
        assert_eq!(tiles.len(), 49);
        assert!(tiles
            .iter()
            .all(|tile| tile.x >= 32.0 && tile.x <= 128.0 && tile.y >= 32.0 && tile.y <= 128.0));

        let corner = map.tiles_near(TileCoord { x: 0, y: 0 }, 3);
        assert_eq!(corner.len(), 16);
    }

    #[test]
    fn pixel_to_tile_floors_negative_coordinates() {
        let map = Tilemap::new(1, 1, (16, 16), Vec::new(), HashMap::new()).expect("tilemap");
        assert_eq!(
            map.pixel_to_tile(Vec2::new(-1.0, 31.9)),
            TileCoord { x: -1, y: 1 }
        );
    }

    #[test]
    fn missing_object_layer_is_empty() {
        let map = Tilemap::new(1, 1, (16, 16), Vec::new(), HashMap::new()).expect("tilemap");
        assert!(map.object_layer("npcs").is_empty());
    }
}
