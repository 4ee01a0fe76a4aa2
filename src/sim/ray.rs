//! Explosion rays: one blast arm per cardinal direction

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::body::PhysicalBody;
use super::level::TileCoord;
use crate::consts::TILE_SIZE;
use crate::tile_center;

/// Direction of a blast arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Up,
    Down,
    Left,
    Right,
}

impl Side {
    /// Fixed iteration order, also the ray slot order in a bomb
    pub const ALL: [Side; 4] = [Side::Up, Side::Down, Side::Left, Side::Right];

    /// One-tile step in grid space (y grows downward)
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Side::Up => IVec2::NEG_Y,
            Side::Down => IVec2::Y,
            Side::Left => IVec2::NEG_X,
            Side::Right => IVec2::X,
        }
    }

    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// One arm of an explosion
///
/// The body covers `length` whole tiles starting next to the origin tile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ray {
    pub side: Side,
    /// Extent in tiles (0 when the neighbouring tile is indestructible)
    pub length: u32,
    pub body: PhysicalBody,
}

impl Ray {
    pub fn new(side: Side, origin: TileCoord, length: u32) -> Self {
        let delta = side.delta().as_vec2();
        let span = length as f32 * TILE_SIZE;
        // Centre of the covered strip: half a tile to the origin edge, then half the span
        let pos = tile_center(origin) + delta * (TILE_SIZE / 2.0 + span / 2.0);
        let size = if delta.x != 0.0 {
            Vec2::new(span, TILE_SIZE)
        } else {
            Vec2::new(TILE_SIZE, span)
        };
        Self {
            side,
            length,
            body: PhysicalBody::new(pos, size),
        }
    }

    /// A zero-length ray covers nothing
    pub fn is_collision(&self, body: &PhysicalBody) -> bool {
        self.length > 0 && self.body.is_collision(body)
    }
}
