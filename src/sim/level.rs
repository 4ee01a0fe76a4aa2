//! Tile grid and destruction rules
//!
//! The level owns the grid for a whole match. Every mutation is queued as a
//! [`TileChange`] so a renderer can mirror the grid without reading it back.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Grid coordinate of a tile (x = column, y = row)
pub type TileCoord = IVec2;

/// Cell state of the level grid
///
/// Declaration order matters: everything after `EmptyShadowed` is solid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Empty = 0,
    /// Floor with a wall shadow painted on it; still walkable
    EmptyShadowed = 1,
    WeakWall = 2,
    /// Two-tall weak wall (lower half of the sprite stack)
    DoubleWeakWall = 3,
    IndestructibleWall = 4,
    DoubleIndestructibleWall = 5,
    HalfIndestructibleWall = 6,
    BombOccupied = 7,
}

impl Tile {
    /// Number of tile kinds in the file format
    pub const COUNT: u8 = 8;

    /// Bodies can walk over this tile
    #[inline]
    pub fn is_walkable(self) -> bool {
        self <= Tile::EmptyShadowed
    }

    /// Blocks movement and explosion rays
    #[inline]
    pub fn is_solid(self) -> bool {
        self > Tile::EmptyShadowed
    }

    /// Destroyed when an explosion ray reaches it
    #[inline]
    pub fn is_weak_wall(self) -> bool {
        matches!(self, Tile::WeakWall | Tile::DoubleWeakWall)
    }

    /// Index used by the level file format and tile atlases
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Tile::Empty),
            1 => Some(Tile::EmptyShadowed),
            2 => Some(Tile::WeakWall),
            3 => Some(Tile::DoubleWeakWall),
            4 => Some(Tile::IndestructibleWall),
            5 => Some(Tile::DoubleIndestructibleWall),
            6 => Some(Tile::HalfIndestructibleWall),
            7 => Some(Tile::BombOccupied),
            _ => None,
        }
    }
}

/// A single grid mutation, queued for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    pub coord: TileCoord,
    pub tile: Tile,
}

/// Rendering collaborator that mirrors the tile grid
pub trait LevelView {
    fn tile_changed(&mut self, coord: TileCoord, tile: Tile);
}

/// The tile grid of one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    width: i32,
    height: i32,
    /// Row-major tiles
    tiles: Vec<Tile>,
    /// Grid as loaded, restored by `reset`
    initial: Vec<Tile>,
    /// Mutations not yet consumed by the renderer
    #[serde(skip)]
    changes: Vec<TileChange>,
}

impl Level {
    /// Build a level from row-major tiles
    ///
    /// Panics if `tiles.len() != width * height`.
    pub fn new(width: i32, height: i32, tiles: Vec<Tile>) -> Self {
        assert!(width > 0 && height > 0, "level must not be empty");
        assert_eq!(
            tiles.len(),
            (width * height) as usize,
            "tile count does not match {}x{}",
            width,
            height
        );
        Self {
            width,
            height,
            initial: tiles.clone(),
            tiles,
            changes: Vec::new(),
        }
    }

    /// Open arena: indestructible border, empty inside
    pub fn bordered(width: i32, height: i32) -> Self {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                tiles.push(if border {
                    Tile::IndestructibleWall
                } else {
                    Tile::Empty
                });
            }
        }
        Self::new(width, height, tiles)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }

    #[inline]
    fn index(&self, coord: TileCoord) -> usize {
        assert!(
            self.in_bounds(coord),
            "tile ({}, {}) outside {}x{} level",
            coord.x,
            coord.y,
            self.width,
            self.height
        );
        (coord.y * self.width + coord.x) as usize
    }

    /// Tile at `coord`. Querying outside the grid is a logic error and panics.
    #[inline]
    pub fn tile_at(&self, coord: TileCoord) -> Tile {
        self.tiles[self.index(coord)]
    }

    /// Checked tile lookup
    #[inline]
    pub fn get(&self, coord: TileCoord) -> Option<Tile> {
        if self.in_bounds(coord) {
            Some(self.tiles[(coord.y * self.width + coord.x) as usize])
        } else {
            None
        }
    }

    /// Row-major view of the grid
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn set(&mut self, coord: TileCoord, tile: Tile) {
        let idx = self.index(coord);
        self.tiles[idx] = tile;
        self.changes.push(TileChange { coord, tile });
    }

    /// Destroy the tile at `coord`, applying the shadow and wall-stack rules
    ///
    /// Returns false (and changes nothing) if the tile is already floor.
    pub fn destroy_tile(&mut self, coord: TileCoord) -> bool {
        if self.tile_at(coord).is_walkable() {
            return false;
        }

        let above = coord - IVec2::Y;
        let below = coord + IVec2::Y;

        let casts_shadow = self
            .get(above)
            .is_some_and(|t| t.is_solid() && t != Tile::BombOccupied);
        self.set(
            coord,
            if casts_shadow {
                Tile::EmptyShadowed
            } else {
                Tile::Empty
            },
        );

        // Shadow under the destroyed tile has nothing left to fall from
        if self.get(below) == Some(Tile::EmptyShadowed) {
            self.set(below, Tile::Empty);
        }

        // Lower half of a stacked wall is gone
        match self.get(above) {
            Some(Tile::DoubleWeakWall) => self.set(above, Tile::WeakWall),
            Some(Tile::DoubleIndestructibleWall | Tile::HalfIndestructibleWall) => {
                self.set(above, Tile::IndestructibleWall)
            }
            _ => {}
        }

        log::debug!("Destroyed tile ({}, {})", coord.x, coord.y);
        true
    }

    /// Mark a cell as holding a bomb (no cascade)
    pub fn mark_bomb(&mut self, coord: TileCoord) {
        self.set(coord, Tile::BombOccupied);
    }

    /// Mark a cell as a weak wall (no cascade)
    pub fn mark_destructible(&mut self, coord: TileCoord) {
        self.set(coord, Tile::WeakWall);
    }

    /// Restore the floor under a bomb that moved away
    ///
    /// Unlike `destroy_tile` this never touches neighbouring tiles.
    pub fn clear_bomb(&mut self, coord: TileCoord) -> bool {
        if self.tile_at(coord) != Tile::BombOccupied {
            return false;
        }
        let casts_shadow = self
            .get(coord - IVec2::Y)
            .is_some_and(|t| t.is_solid() && t != Tile::BombOccupied);
        self.set(
            coord,
            if casts_shadow {
                Tile::EmptyShadowed
            } else {
                Tile::Empty
            },
        );
        true
    }

    /// Repopulate the grid as it was loaded ("play again")
    pub fn reset(&mut self) {
        for i in 0..self.tiles.len() {
            if self.tiles[i] != self.initial[i] {
                let coord = IVec2::new(i as i32 % self.width, i as i32 / self.width);
                self.tiles[i] = self.initial[i];
                self.changes.push(TileChange {
                    coord,
                    tile: self.initial[i],
                });
            }
        }
    }

    /// Drain pending grid mutations
    pub fn take_changes(&mut self) -> Vec<TileChange> {
        std::mem::take(&mut self.changes)
    }

    /// Forward pending grid mutations to a view
    pub fn flush_changes(&mut self, view: &mut impl LevelView) {
        for change in self.changes.drain(..) {
            view.tile_changed(change.coord, change.tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn column(tiles: &[Tile]) -> Level {
        Level::new(1, tiles.len() as i32, tiles.to_vec())
    }

    #[test]
    fn test_tile_ordering() {
        assert!(Tile::Empty.is_walkable());
        assert!(Tile::EmptyShadowed.is_walkable());
        for index in 2..Tile::COUNT {
            let tile = Tile::from_index(index).unwrap();
            assert!(tile.is_solid(), "{:?} should be solid", tile);
            assert_eq!(tile.index(), index);
        }
        assert_eq!(Tile::from_index(Tile::COUNT), None);
    }

    #[test]
    fn test_destroy_under_wall_leaves_shadow() {
        let mut level = column(&[Tile::IndestructibleWall, Tile::WeakWall, Tile::Empty]);
        assert!(level.destroy_tile(IVec2::new(0, 1)));
        assert_eq!(level.tile_at(IVec2::new(0, 1)), Tile::EmptyShadowed);
    }

    #[test]
    fn test_destroy_under_bomb_leaves_plain_floor() {
        let mut level = column(&[Tile::BombOccupied, Tile::WeakWall, Tile::Empty]);
        assert!(level.destroy_tile(IVec2::new(0, 1)));
        assert_eq!(level.tile_at(IVec2::new(0, 1)), Tile::Empty);
    }

    #[test]
    fn test_destroy_clears_shadow_below() {
        let mut level = column(&[Tile::Empty, Tile::WeakWall, Tile::EmptyShadowed]);
        level.destroy_tile(IVec2::new(0, 1));
        assert_eq!(level.tile_at(IVec2::new(0, 1)), Tile::Empty);
        assert_eq!(level.tile_at(IVec2::new(0, 2)), Tile::Empty);
    }

    #[test]
    fn test_destroy_downgrades_stacked_walls() {
        let mut level = column(&[Tile::DoubleWeakWall, Tile::WeakWall]);
        level.destroy_tile(IVec2::new(0, 1));
        assert_eq!(level.tile_at(IVec2::new(0, 0)), Tile::WeakWall);
        assert_eq!(level.tile_at(IVec2::new(0, 1)), Tile::EmptyShadowed);

        let mut level = column(&[Tile::HalfIndestructibleWall, Tile::WeakWall]);
        level.destroy_tile(IVec2::new(0, 1));
        assert_eq!(level.tile_at(IVec2::new(0, 0)), Tile::IndestructibleWall);

        let mut level = column(&[Tile::DoubleIndestructibleWall, Tile::WeakWall]);
        level.destroy_tile(IVec2::new(0, 1));
        assert_eq!(level.tile_at(IVec2::new(0, 0)), Tile::IndestructibleWall);
    }

    #[test]
    fn test_destroy_records_changes() {
        let mut level = column(&[Tile::DoubleWeakWall, Tile::WeakWall, Tile::EmptyShadowed]);
        level.destroy_tile(IVec2::new(0, 1));
        let changes = level.take_changes();
        assert_eq!(
            changes,
            vec![
                TileChange {
                    coord: IVec2::new(0, 1),
                    tile: Tile::EmptyShadowed
                },
                TileChange {
                    coord: IVec2::new(0, 2),
                    tile: Tile::Empty
                },
                TileChange {
                    coord: IVec2::new(0, 0),
                    tile: Tile::WeakWall
                },
            ]
        );
        assert!(level.take_changes().is_empty());
    }

    #[test]
    fn test_flush_changes_to_view() {
        struct Recorder(Vec<(TileCoord, Tile)>);
        impl LevelView for Recorder {
            fn tile_changed(&mut self, coord: TileCoord, tile: Tile) {
                self.0.push((coord, tile));
            }
        }

        let mut level = Level::bordered(5, 5);
        level.mark_bomb(IVec2::new(2, 2));
        level.mark_destructible(IVec2::new(3, 2));
        let mut view = Recorder(Vec::new());
        level.flush_changes(&mut view);
        assert_eq!(
            view.0,
            vec![
                (IVec2::new(2, 2), Tile::BombOccupied),
                (IVec2::new(3, 2), Tile::WeakWall)
            ]
        );
    }

    #[test]
    fn test_clear_bomb_does_not_cascade() {
        let mut level = column(&[Tile::DoubleWeakWall, Tile::BombOccupied, Tile::EmptyShadowed]);
        assert!(level.clear_bomb(IVec2::new(0, 1)));
        assert_eq!(level.tile_at(IVec2::new(0, 0)), Tile::DoubleWeakWall);
        assert_eq!(level.tile_at(IVec2::new(0, 1)), Tile::EmptyShadowed);
        assert_eq!(level.tile_at(IVec2::new(0, 2)), Tile::EmptyShadowed);
        assert!(!level.clear_bomb(IVec2::new(0, 1)));
    }

    #[test]
    fn test_reset_restores_loaded_grid() {
        let mut level = Level::bordered(5, 5);
        level.mark_destructible(IVec2::new(2, 2));
        level.destroy_tile(IVec2::new(0, 2));
        level.take_changes();

        level.reset();
        assert_eq!(level.tiles(), Level::bordered(5, 5).tiles());
        assert_eq!(level.take_changes().len(), 2);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_tile_at_out_of_bounds_panics() {
        let level = Level::bordered(3, 3);
        level.tile_at(IVec2::new(3, 0));
    }

    #[test]
    fn test_get_out_of_bounds_is_none() {
        let level = Level::bordered(3, 3);
        assert_eq!(level.get(IVec2::new(-1, 0)), None);
        assert_eq!(level.get(IVec2::new(0, 3)), None);
        assert_eq!(level.get(IVec2::new(1, 1)), Some(Tile::Empty));
    }

    fn arb_tile() -> impl Strategy<Value = Tile> {
        (0..Tile::COUNT).prop_map(|i| Tile::from_index(i).unwrap())
    }

    proptest! {
        #[test]
        fn prop_destroy_tile_is_idempotent(
            tiles in proptest::collection::vec(arb_tile(), 25),
            x in 0i32..5,
            y in 0i32..5,
        ) {
            let mut level = Level::new(5, 5, tiles);
            let coord = IVec2::new(x, y);
            level.destroy_tile(coord);
            let after_first = level.tiles().to_vec();
            level.take_changes();

            prop_assert!(!level.destroy_tile(coord));
            prop_assert_eq!(level.tiles(), &after_first[..]);
            prop_assert!(level.take_changes().is_empty());
        }
    }
}
