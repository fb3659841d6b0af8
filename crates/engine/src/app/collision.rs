use super::{Rect, Tilemap, Vec2};

pub const COLLISION_NEIGHBOR_RADIUS_TILES: i32 = 3;

/// A moving rectangle that collides with solid tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicBody {
    pub rect: Rect,
    pub vel: Vec2,
    pub jumping: bool,
}

impl KinematicBody {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            vel: Vec2::ZERO,
            jumping: false,
        }
    }
}

/// Moves `body` by its velocity against the solid tiles around it.
///
/// The x axis is fully resolved before the y axis. Fast bodies can tunnel
/// through thin geometry when `vel * dt` exceeds a tile.
pub fn resolve_tile_collisions(body: &mut KinematicBody, tilemap: &Tilemap, dt: f32) {
    let center = tilemap.pixel_to_tile(body.rect.topleft());
    let tiles = tilemap.tiles_near(center, COLLISION_NEIGHBOR_RADIUS_TILES);
    move_and_collide(body, &tiles, dt);
}

pub fn move_and_collide(body: &mut KinematicBody, tiles: &[Rect], dt: f32) {
    body.rect.x += body.vel.x * dt;
    for tile in tiles {
        if !body.rect.intersects(tile) {
            continue;
        }
        if body.vel.x > 0.0 {
            body.rect.set_right(tile.left());
        } else if body.vel.x < 0.0 {
            body.rect.set_left(tile.right());
        }
    }

    body.rect.y += body.vel.y * dt;
    for tile in tiles {
        if !body.rect.intersects(tile) {
            continue;
        }
        if body.vel.y > 0.0 {
            body.rect.set_bottom(tile.top());
            body.jumping = false;
            body.vel.y = 0.0;
        } else if body.vel.y < 0.0 {
            body.rect.set_top(tile.bottom());
            body.vel.y = 0.0;
        }
    }

    // still falling after resolution: no jump until the next landing
    if body.vel.y > 0.0 {
        body.jumping = true;
    }
}
