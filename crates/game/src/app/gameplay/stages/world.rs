use engine::{
    AssetError, AssetStore, InputSnapshot, ParallaxBackground, ParallaxLayer, Rect, Stage, Surface,
    Tilemap, Vec2,
};
use tracing::{debug, warn};

use crate::app::gameplay::session::PlaySession;

const TILE: f32 = 16.0;
pub(crate) const SUBURB_END_X: f32 = 124.5 * TILE;
pub(crate) const DOWNTOWN_END_X: f32 = 283.0 * TILE;
pub(crate) const DOWNTOWN_MIN_Y: f32 = 4.0 * TILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Zone {
    Suburb,
    Downtown,
    Beach,
}

impl Zone {
    /// Positions matching no zone (high up at the downtown end) keep the
    /// current one.
    pub(crate) fn resolve(current: Zone, position: Vec2) -> Zone {
        if position.x <= SUBURB_END_X {
            Zone::Suburb
        } else if position.x <= DOWNTOWN_END_X && position.y > DOWNTOWN_MIN_Y {
            Zone::Downtown
        } else if position.x >= DOWNTOWN_END_X {
            Zone::Beach
        } else {
            current
        }
    }
}

fn layer(assets: &AssetStore, name: &str, factor: f32) -> Result<ParallaxLayer, AssetError> {
    Ok(ParallaxLayer {
        sprite: assets.sprite(name)?,
        factor,
    })
}

pub(crate) struct BackgroundStage {
    zone: Zone,
    suburb: ParallaxBackground,
    downtown: ParallaxBackground,
    beach: ParallaxBackground,
}

impl BackgroundStage {
    pub(crate) fn new(assets: &AssetStore) -> Result<Self, AssetError> {
        let zone_background = |front: &str| -> Result<ParallaxBackground, AssetError> {
            let front_factor = if front == "bg2" { 0.15 } else { 0.2 };
            Ok(ParallaxBackground::new(vec![
                layer(assets, "bg0", 0.025)?,
                layer(assets, "bg1", 0.075)?,
                layer(assets, front, front_factor)?,
            ]))
        };
        Ok(Self {
            zone: Zone::Suburb,
            suburb: zone_background("bg2")?,
            downtown: zone_background("bg4")?,
            beach: zone_background("bg5")?,
        })
    }

    pub(crate) fn zone(&self) -> Zone {
        self.zone
    }
}

impl Stage<PlaySession> for BackgroundStage {
    fn name(&self) -> &'static str {
        "background"
    }

    fn update(&mut self, session: &mut PlaySession, _input: &InputSnapshot) {
        let zone = Zone::resolve(self.zone, session.player.rect().topleft());
        if zone != self.zone {
            debug!(from = ?self.zone, to = ?zone, "zone_changed");
            self.zone = zone;
        }
    }

    fn draw(&mut self, session: &PlaySession, surface: &mut Surface, _input: &InputSnapshot) {
        let background = match self.zone {
            Zone::Suburb => &self.suburb,
            Zone::Downtown => &self.downtown,
            Zone::Beach => &self.beach,
        };
        background.draw(surface, session.camera.scroll());
    }
}

/// Draws the tile layers, pre-rendered once into a map-sized surface.
pub(crate) struct TilesStage {
    map: Surface,
}

impl TilesStage {
    pub(crate) fn new(assets: &AssetStore, tilemap: &Tilemap) -> Result<Self, AssetError> {
        let tileset = assets.sprite("tileset")?;
        let (tile_width, tile_height) = tilemap.tile_size();
        let columns = tileset.width() / tile_width;
        let rows = tileset.height() / tile_height;
        let cells: Vec<_> = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (column, row)))
            .map(|(column, row)| {
                tileset.region(column * tile_width, row * tile_height, tile_width, tile_height)
            })
            .collect();

        let (width, height) = tilemap.pixel_size();
        let mut map = Surface::new(width, height);
        let mut unknown = 0usize;
        for layer in tilemap.layers() {
            for (index, gid) in layer.gids.iter().enumerate() {
                if *gid == 0 {
                    continue;
                }
                let Some(cell) = cells.get(*gid as usize - 1) else {
                    unknown += 1;
                    continue;
                };
                let x = (index as u32 % tilemap.width()) * tile_width;
                let y = (index as u32 / tilemap.width()) * tile_height;
                map.blit(cell, Vec2::new(x as f32, y as f32), 255);
            }
        }
        if unknown > 0 {
            warn!(unknown, tileset_cells = cells.len(), "tiles_outside_tileset");
        }
        Ok(Self { map })
    }
}

impl Stage<PlaySession> for TilesStage {
    fn name(&self) -> &'static str {
        "tiles"
    }

    fn update(&mut self, _session: &mut PlaySession, _input: &InputSnapshot) {}

    fn draw(&mut self, session: &PlaySession, surface: &mut Surface, _input: &InputSnapshot) {
        let scroll = session.camera.scroll();
        surface.blit_surface(&self.map, Vec2::new(-scroll.x, -scroll.y));
    }
}

pub(crate) struct CheckpointStage {
    checkpoints: Vec<Rect>,
}

impl CheckpointStage {
    pub(crate) fn new(tilemap: &Tilemap) -> Self {
        Self {
            checkpoints: tilemap
                .object_layer("checkpoints")
                .iter()
                .map(|object| object.rect)
                .collect(),
        }
    }
}

impl Stage<PlaySession> for CheckpointStage {
    fn name(&self) -> &'static str {
        "checkpoints"
    }

    fn update(&mut self, session: &mut PlaySession, _input: &InputSnapshot) {
        let player = session.player.rect();
        for checkpoint in &self.checkpoints {
            if !checkpoint.intersects(&player) {
                continue;
            }
            // spawn on the checkpoint's edge rather than mid-step
            let settings = &mut session.player.settings;
            let previous = settings.checkpoint_pos;
            settings.set_checkpoint(checkpoint.x, player.y);
            if previous != settings.checkpoint_pos {
                debug!(x = checkpoint.x, y = player.y, "checkpoint_set");
            }
        }
    }
}

pub(crate) struct CameraStage;

impl Stage<PlaySession> for CameraStage {
    fn name(&self) -> &'static str {
        "camera"
    }

    fn update(&mut self, session: &mut PlaySession, input: &InputSnapshot) {
        let target = session.player.rect().topleft();
        session.camera.adjust_to(input.dt(), target);
    }
}

#[cfg(test)]
mod tests {
    use engine::StateHandoff;

    use super::*;
    use crate::app::gameplay::player::Player;
    use crate::app::gameplay::settings::PlayerSettings;
    use crate::app::gameplay::test_support::{self, TestGame};

    fn session_at(game: &TestGame, x: f32, y: f32) -> PlaySession {
        let mut settings = PlayerSettings::default();
        settings.set_checkpoint(x, y);
        let player = Player::new(Vec2::new(10.0, 16.0), settings);
        PlaySession::new(player, &game.resources, StateHandoff::default())
    }

    #[test]
    fn zones_follow_player_position() {
        assert_eq!(Zone::resolve(Zone::Beach, Vec2::new(100.0, 0.0)), Zone::Suburb);
        assert_eq!(
            Zone::resolve(Zone::Suburb, Vec2::new(3000.0, 100.0)),
            Zone::Downtown
        );
        assert_eq!(
            Zone::resolve(Zone::Downtown, Vec2::new(DOWNTOWN_END_X, 0.0)),
            Zone::Beach
        );
        // up on the rooftops the last zone sticks
        assert_eq!(
            Zone::resolve(Zone::Suburb, Vec2::new(3000.0, 10.0)),
            Zone::Suburb
        );
    }

    #[test]
    fn background_stage_switches_zone() {
        let game = TestGame::new();
        let mut stage = BackgroundStage::new(&game.resources.assets).expect("stage");
        let mut session = session_at(&game, 5000.0, 100.0);
        stage.update(&mut session, &InputSnapshot::empty());
        assert_eq!(stage.zone(), Zone::Beach);
    }

    #[test]
    fn tiles_are_prerendered_at_their_cells() {
        let game = TestGame::new();
        let tilemap = test_support::tilemap();
        let stage = TilesStage::new(&game.resources.assets, &tilemap).expect("stage");
        let floor_y = test_support::FLOOR_TOP as u32;
        assert_eq!(stage.map.pixel(0, floor_y), Some([7, 7, 7, 255]));
        assert_eq!(stage.map.pixel(0, floor_y - 1), Some([0, 0, 0, 0]));
        assert_eq!(stage.map.pixel(24 * 16, floor_y), Some([0, 0, 0, 0]));
    }

    #[test]
    fn checkpoint_keeps_player_height() {
        let game = TestGame::new();
        let mut stage = CheckpointStage::new(&test_support::tilemap());
        let mut session = session_at(&game, 130.0, 90.0);
        stage.update(&mut session, &InputSnapshot::empty());
        assert_eq!(session.player.settings.checkpoint_pos, [128.0, 90.0]);
    }

    #[test]
    fn camera_stage_chases_player() {
        let game = TestGame::new();
        let mut session = session_at(&game, 400.0, 100.0);
        CameraStage.update(&mut session, &InputSnapshot::empty());
        assert_eq!(session.camera.scroll().x, 240.0);
    }
}
