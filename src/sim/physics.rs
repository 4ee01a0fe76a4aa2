//! Movable body vs tile grid collision resolution
//!
//! Each frame a body is classified by how many tiles it overlaps
//! ([`ContactState`]) and only the tiles that can actually be hit from that
//! footprint are tested. A blocked axis snaps the body flush against the tile
//! and loses its movement for the frame; the owner applies whatever movement
//! survives.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::body::{ContactState, MovableBodyInfo, PhysicalBody};
use super::level::{Level, Tile, TileCoord};
use super::player::Player;
use crate::consts::SNAP_EPSILON;

/// A push on a bomb found while resolving movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickIntent {
    /// Unit grid step the player was moving in
    pub direction: IVec2,
    /// Tile holding the bomb
    pub target: TileCoord,
}

/// Outcome of resolving one body for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub info: MovableBodyInfo,
    pub kick: Option<KickIntent>,
}

/// Tiles outside the grid behave like the indestructible border
#[inline]
fn tile_or_wall(level: &Level, coord: TileCoord) -> Tile {
    level.get(coord).unwrap_or(Tile::IndestructibleWall)
}

/// `moved` would run into the solid tile at `coord`
fn blocks(level: &Level, coord: TileCoord, moved: &PhysicalBody) -> Option<Tile> {
    let tile = tile_or_wall(level, coord);
    (tile.is_solid() && moved.is_collision(&PhysicalBody::tile(coord))).then_some(tile)
}

/// First of `candidates` that blocks `moved`
fn first_blocking(
    level: &Level,
    moved: &PhysicalBody,
    candidates: impl IntoIterator<Item = TileCoord>,
) -> Option<(TileCoord, Tile)> {
    candidates
        .into_iter()
        .find_map(|coord| blocks(level, coord, moved).map(|tile| (coord, tile)))
}

/// Resolve one body against the grid for a frame of length `dt`
///
/// Writes the allowed displacement to `body.movement` and may snap
/// `body.pos` against a blocking tile. The position is not advanced here.
pub fn resolve_body(level: &Level, body: &mut PhysicalBody, dt: f32) -> Resolution {
    let info = MovableBodyInfo::from_body(body);
    body.movement = Vec2::ZERO;

    let step = body.vel * dt;
    if step == Vec2::ZERO {
        return Resolution { info, kick: None };
    }

    let after_x = body.translated(Vec2::new(step.x, 0.0));
    let after_y = body.translated(Vec2::new(0.0, step.y));

    let mut move_x = true;
    let mut move_y = true;
    let mut kick = None;
    let center = info.center;

    match info.state {
        ContactState::SingleTile => {
            let vertical = [center + IVec2::NEG_Y, center + IVec2::Y];
            if let Some((coord, tile)) = first_blocking(level, &after_y, vertical) {
                if tile == Tile::BombOccupied {
                    kick = Some(KickIntent {
                        direction: coord - center,
                        target: coord,
                    });
                }
                body.snap_y_against(&PhysicalBody::tile(coord), SNAP_EPSILON);
                move_y = false;
            }

            let horizontal = [center + IVec2::NEG_X, center + IVec2::X];
            if let Some((coord, tile)) = first_blocking(level, &after_x, horizontal) {
                if tile == Tile::BombOccupied {
                    kick = Some(KickIntent {
                        direction: coord - center,
                        target: coord,
                    });
                }
                body.snap_x_against(&PhysicalBody::tile(coord), SNAP_EPSILON);
                move_x = false;
            }
        }

        ContactState::TwoTilesHorizontal => {
            let other = info.other_column();
            let candidates = [center.x, other].into_iter().flat_map(|x| {
                [IVec2::new(x, center.y - 1), IVec2::new(x, center.y + 1)]
            });
            if let Some((coord, _)) = first_blocking(level, &after_y, candidates) {
                body.snap_y_against(&PhysicalBody::tile(coord), SNAP_EPSILON);
                move_y = false;
            }
        }

        ContactState::TwoTilesVertical => {
            let other = info.other_row();
            let candidates = [center.y, other].into_iter().flat_map(|y| {
                [IVec2::new(center.x - 1, y), IVec2::new(center.x + 1, y)]
            });
            if let Some((coord, _)) = first_blocking(level, &after_x, candidates) {
                body.snap_x_against(&PhysicalBody::tile(coord), SNAP_EPSILON);
                move_x = false;
            }
        }

        ContactState::FourTiles => {
            // Tie-break order: top-left, top-right, bottom-left, bottom-right
            let corners = [
                IVec2::new(info.left, info.up),
                IVec2::new(info.right, info.up),
                IVec2::new(info.left, info.down),
                IVec2::new(info.right, info.down),
            ];
            // A bomb in a corner never blocks; it can only be kicked head-on
            let blocking = corners.into_iter().find(|&coord| {
                blocks(level, coord, &after_x).is_some_and(|tile| tile != Tile::BombOccupied)
            });
            if let Some(coord) = blocking {
                let tile_body = PhysicalBody::tile(coord);
                body.snap_x_against(&tile_body, SNAP_EPSILON);
                body.snap_y_against(&tile_body, SNAP_EPSILON);
                move_x = false;
                move_y = false;
            }
        }
    }

    body.movement = Vec2::new(
        if move_x { step.x } else { 0.0 },
        if move_y { step.y } else { 0.0 },
    );

    Resolution { info, kick }
}

/// Resolve every living player against the grid
///
/// Refreshes each player's footprint and replaces its kick intent with the
/// one found this frame.
pub fn update(level: &Level, players: &mut [Player], dt: f32) {
    for player in players.iter_mut().filter(|p| p.is_alive) {
        let resolution = resolve_body(level, &mut player.body, dt);
        player.info = resolution.info;
        player.kick = resolution.kick;
        if let Some(kick) = resolution.kick {
            log::debug!(
                "Player {} pushing bomb at ({}, {})",
                player.id,
                kick.target.x,
                kick.target.y
            );
        }
    }
}
