//! Bomberman - tile-grid arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile grid, body collisions, bombs, explosions)
//! - `persistence`: Level file format
//! - `settings`: Data-driven match rules

pub mod persistence;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Edge length of one grid tile in world pixels
    pub const TILE_SIZE: f32 = 64.0;
    /// Maximum explosion ray length in tiles
    pub const MAX_RAY_LENGTH: u32 = 4;
    /// Gap left between a blocked body and the tile it was pushed against
    pub const SNAP_EPSILON: f32 = 0.1;

    /// Number of players in a match
    pub const PLAYER_COUNT: usize = 2;
}

/// Tile index containing a world-space scalar coordinate
#[inline]
pub fn world_to_tile(v: f32) -> i32 {
    (v / consts::TILE_SIZE).floor() as i32
}

/// World-space centre of the tile at `tile`
#[inline]
pub fn tile_center(tile: IVec2) -> Vec2 {
    let half = consts::TILE_SIZE / 2.0;
    Vec2::new(
        tile.x as f32 * consts::TILE_SIZE + half,
        tile.y as f32 * consts::TILE_SIZE + half,
    )
}

/// Tile containing a world-space point
#[inline]
pub fn world_to_tile_coords(pos: Vec2) -> IVec2 {
    IVec2::new(world_to_tile(pos.x), world_to_tile(pos.y))
}
