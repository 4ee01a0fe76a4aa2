//! Per-frame coordination of every bomb and blast against the players
//!
//! Three passes, strictly in this order:
//! 1. gather waiting bombs (keyed by tile) and exploding bombs (by owner)
//! 2. slide kicked bombs and hand out new kicks
//! 3. rays vs players (damage) and rays vs waiting bombs (chain reactions)
//!
//! Nothing is kept between frames; the collections are rebuilt every tick.

use std::collections::BTreeMap;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::body::PhysicalBody;
use super::bomb::{Bomb, BombState};
use super::level::{Level, Tile};
use super::player::Player;
use super::state::GameEvent;
use crate::tile_center;

/// Bomb lookup key: tile `(x, y)`
pub type BombKey = (i32, i32);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BombManager {
    /// Waiting bombs by tile; value is the owning player index
    #[serde(skip)]
    bombs: BTreeMap<BombKey, usize>,
    /// Owners of the bombs that were exploding when the frame started
    #[serde(skip)]
    exploding: Vec<usize>,
    /// Slide speed given to kicked bombs, pixels per second
    kick_speed: f32,
}

impl BombManager {
    pub fn new(kick_speed: f32) -> Self {
        Self {
            bombs: BTreeMap::new(),
            exploding: Vec::new(),
            kick_speed,
        }
    }

    /// Run all three passes for one frame
    pub fn update(
        &mut self,
        level: &mut Level,
        players: &mut [Player],
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        self.gather(players);
        self.handle_kicking(level, players, dt, events);
        self.check_explosions(level, players, events);
        self.bombs.clear();
        self.exploding.clear();
    }

    fn gather(&mut self, players: &[Player]) {
        self.bombs.clear();
        self.exploding.clear();

        for player in players {
            let Some(bomb) = player.bomb.as_ref() else {
                continue;
            };

            if player.has_bomb() {
                let tile = bomb.tile();
                if let Some(previous) = self.bombs.insert((tile.x, tile.y), player.id) {
                    // Later player wins the slot; the other bomb still ticks on its own
                    log::warn!(
                        "Bombs of players {} and {} share tile ({}, {})",
                        previous,
                        player.id,
                        tile.x,
                        tile.y
                    );
                }
            }

            if player.is_bomb_exploding() {
                self.exploding.push(player.id);
            }
        }
    }

    fn handle_kicking(
        &mut self,
        level: &mut Level,
        players: &mut [Player],
        dt: f32,
        events: &mut Vec<GameEvent>,
    ) {
        let keys: Vec<BombKey> = self.bombs.keys().copied().collect();

        for key in keys {
            let tile = IVec2::new(key.0, key.1);
            let Some(&owner) = self.bombs.get(&key) else {
                continue;
            };

            if let Some(bomb) = waiting_bomb(players, owner) {
                slide_or_settle(bomb, level, dt);
            }

            // One kick per tile per frame; lower player index first
            let kicker = players
                .iter()
                .position(|p| p.is_alive && p.kick.is_some_and(|k| k.target == tile));
            if let Some(kicker) = kicker {
                if let Some(kick) = players[kicker].kick.take() {
                    if let Some(bomb) = waiting_bomb(players, owner) {
                        bomb.set_move_direction(kick.direction, self.kick_speed);
                        log::debug!(
                            "Player {} kicked bomb at ({}, {}) towards ({}, {})",
                            kicker,
                            tile.x,
                            tile.y,
                            kick.direction.x,
                            kick.direction.y
                        );
                        events.push(GameEvent::BombKicked {
                            player: kicker,
                            bomb_owner: owner,
                            direction: kick.direction,
                        });
                    }
                }
            }

            // A player standing in the path stops the slide
            let next = match waiting_bomb(players, owner) {
                Some(bomb) if bomb.is_moving => bomb.next_tile(),
                _ => continue,
            };
            let blocked = players.iter().any(|p| p.is_alive && p.occupies_tile(next));
            if blocked {
                if let Some(bomb) = waiting_bomb(players, owner) {
                    settle(bomb, level);
                }
            }
        }
    }

    fn check_explosions(
        &mut self,
        level: &mut Level,
        players: &mut [Player],
        events: &mut Vec<GameEvent>,
    ) {
        for &owner in &self.exploding {
            let hit: Vec<usize> = match exploding_bomb(players, owner) {
                Some(bomb) => players
                    .iter()
                    .filter(|p| p.is_alive && bomb.is_object_in_ray(&p.body))
                    .map(|p| p.id)
                    .collect(),
                None => continue,
            };
            for id in hit {
                let player = &mut players[id];
                if player.on_bomb_collision() {
                    events.push(GameEvent::PlayerHit {
                        player: id,
                        by: owner,
                        respawns_left: player.respawns,
                    });
                }
            }
        }

        // Chain reactions are forced in the same frame
        let owners: Vec<usize> = self.bombs.values().copied().collect();
        for owner in owners {
            let Some(tile) = waiting_bomb(players, owner).map(|b| b.tile()) else {
                continue;
            };
            let centre = PhysicalBody::new(tile_center(tile), Vec2::ZERO);
            let shared: &[Player] = players;
            let trigger = self.exploding.iter().copied().find(|&other| {
                exploding_bomb(shared, other).is_some_and(|b| b.is_object_in_ray(&centre))
            });

            let Some(triggered_by) = trigger else {
                continue;
            };
            if let Some(bomb) = waiting_bomb(players, owner) {
                if bomb.detonate_now(level) {
                    log::debug!(
                        "Chain reaction: bomb of player {} at ({}, {}) set off by player {}",
                        owner,
                        tile.x,
                        tile.y,
                        triggered_by
                    );
                    events.push(GameEvent::ChainReaction {
                        owner,
                        tile,
                        triggered_by,
                    });
                    events.push(GameEvent::BombExploded { owner, tile });
                }
            }
        }
    }
}

/// The player's bomb if its rays are live
fn exploding_bomb(players: &[Player], owner: usize) -> Option<&Bomb> {
    players
        .get(owner)?
        .bomb
        .as_ref()
        .filter(|b| b.state == BombState::Exploding)
}

/// The player's bomb if it is still on its fuse
fn waiting_bomb(players: &mut [Player], owner: usize) -> Option<&mut Bomb> {
    players
        .get_mut(owner)?
        .bomb
        .as_mut()
        .filter(|b| b.state == BombState::WaitingForExplosion)
}

/// Slide a kicked bomb one frame or pin it to its tile
fn slide_or_settle(bomb: &mut Bomb, level: &mut Level, dt: f32) {
    let path_clear = level.get(bomb.next_tile()).is_some_and(Tile::is_walkable);
    if bomb.is_moving && path_clear {
        let from = bomb.tile();
        bomb.advance(dt);
        level.clear_bomb(from);
    } else {
        settle(bomb, level);
    }
}

/// Stop, snap to the tile centre and block the tile again
fn settle(bomb: &mut Bomb, level: &mut Level) {
    bomb.stop_moving();
    bomb.fix_position();
    let tile = bomb.tile();
    if level.tile_at(tile) != Tile::BombOccupied {
        level.mark_bomb(tile);
    }
}
