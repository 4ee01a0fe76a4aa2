//! Axis-aligned bodies and their tile-space footprint
//!
//! Every entity (player, bomb, ray, static tile) embeds a [`PhysicalBody`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::TileCoord;
use crate::consts::TILE_SIZE;
use crate::{tile_center, world_to_tile, world_to_tile_coords};

/// Axis-aligned rectangle with velocity
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalBody {
    /// Centre in world pixels
    pub pos: Vec2,
    /// Full extent in world pixels
    pub size: Vec2,
    /// Velocity in pixels per second
    pub vel: Vec2,
    /// Displacement granted by the physics pass for the current frame
    pub movement: Vec2,
}

impl PhysicalBody {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            ..Default::default()
        }
    }

    /// Static body covering a whole tile
    pub fn tile(coord: TileCoord) -> Self {
        Self::new(tile_center(coord), Vec2::splat(TILE_SIZE))
    }

    #[inline]
    pub fn half_size(&self) -> Vec2 {
        self.size / 2.0
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.pos - self.half_size()
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.pos + self.half_size()
    }

    /// AABB overlap test; touching edges count as overlap
    pub fn is_collision(&self, other: &PhysicalBody) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        !(a_max.y < b_min.y || a_min.y > b_max.y || a_max.x < b_min.x || a_min.x > b_max.x)
    }

    /// Copy of this body moved by `offset`
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            pos: self.pos + offset,
            ..*self
        }
    }

    /// Tile containing the body centre
    #[inline]
    pub fn tile_coords(&self) -> TileCoord {
        world_to_tile_coords(self.pos)
    }

    /// Push this body flush against `other` along X, on the side it is already on
    pub fn snap_x_against(&mut self, other: &PhysicalBody, epsilon: f32) {
        let offset = other.half_size().x + self.half_size().x + epsilon;
        self.pos.x = if self.pos.x > other.pos.x {
            other.pos.x + offset
        } else {
            other.pos.x - offset
        };
    }

    /// Push this body flush against `other` along Y, on the side it is already on
    pub fn snap_y_against(&mut self, other: &PhysicalBody, epsilon: f32) {
        let offset = other.half_size().y + self.half_size().y + epsilon;
        self.pos.y = if self.pos.y > other.pos.y {
            other.pos.y + offset
        } else {
            other.pos.y - offset
        };
    }
}

/// How many grid tiles a body currently overlaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactState {
    #[default]
    SingleTile,
    /// Straddles one vertical grid line (two tiles side by side)
    TwoTilesHorizontal,
    /// Straddles one horizontal grid line (two tiles stacked)
    TwoTilesVertical,
    /// Straddles a grid corner
    FourTiles,
}

/// Tile-space footprint of a movable body, recomputed every frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovableBodyInfo {
    /// Tile holding the body centre
    pub center: TileCoord,
    pub up: i32,
    pub down: i32,
    pub left: i32,
    pub right: i32,
    pub state: ContactState,
}

impl MovableBodyInfo {
    pub fn from_body(body: &PhysicalBody) -> Self {
        let (min, max) = (body.min(), body.max());
        // Edges are truncated to whole pixels before bucketing into tiles
        let up = world_to_tile(min.y.floor());
        let down = world_to_tile(max.y.floor());
        let left = world_to_tile(min.x.floor());
        let right = world_to_tile(max.x.floor());

        let state = match (up == down, left == right) {
            (true, true) => ContactState::SingleTile,
            (false, true) => ContactState::TwoTilesVertical,
            (true, false) => ContactState::TwoTilesHorizontal,
            (false, false) => ContactState::FourTiles,
        };

        Self {
            center: body.tile_coords(),
            up,
            down,
            left,
            right,
            state,
        }
    }

    /// Column of the second tile when straddling horizontally
    pub fn other_column(&self) -> i32 {
        if self.left == self.center.x {
            self.right
        } else {
            self.left
        }
    }

    /// Row of the second tile when straddling vertically
    pub fn other_row(&self) -> i32 {
        if self.up == self.center.y {
            self.down
        } else {
            self.up
        }
    }

    /// Footprint covers column `x`
    pub fn spans_column(&self, x: i32) -> bool {
        x == self.center.x || x == self.left || x == self.right
    }

    /// Footprint covers row `y`
    pub fn spans_row(&self, y: i32) -> bool {
        y == self.center.y || y == self.up || y == self.down
    }
}
