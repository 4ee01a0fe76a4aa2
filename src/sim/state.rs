//! Match state and the events it reports
//!
//! Everything a running match needs lives here; `tick` is the only thing that
//! advances it.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::bomb_manager::BombManager;
use super::level::{Level, TileCoord};
use super::player::Player;
use crate::consts::PLAYER_COUNT;
use crate::settings::Settings;

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Playing,
    Paused,
    /// At most one player left; `None` when the last two went down together
    Over { winner: Option<usize> },
}

/// Something that happened during a tick, for audio/animation/UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BombPlaced {
        player: usize,
        tile: TileCoord,
    },
    BombKicked {
        player: usize,
        bomb_owner: usize,
        direction: IVec2,
    },
    BombExploded {
        owner: usize,
        tile: TileCoord,
    },
    /// A blast set off another bomb before its fuse ran out
    ChainReaction {
        owner: usize,
        tile: TileCoord,
        triggered_by: usize,
    },
    TileDestroyed {
        tile: TileCoord,
    },
    PlayerHit {
        player: usize,
        by: usize,
        respawns_left: u32,
    },
    PlayerEliminated {
        player: usize,
    },
    MatchOver {
        winner: Option<usize>,
    },
}

/// Complete match state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub level: Level,
    /// Sorted by id; index == id
    pub players: Vec<Player>,
    pub bomb_manager: BombManager,
    pub phase: MatchPhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending events, drained by `take_events`
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl MatchState {
    /// Start a match on `level` with players on their spawn tiles
    pub fn new(level: Level, settings: &Settings) -> Self {
        let players = spawn_tiles(&level, settings)
            .into_iter()
            .enumerate()
            .map(|(id, tile)| Player::new(id, tile, settings))
            .collect();

        log::info!(
            "Match started on {}x{} level",
            level.width(),
            level.height()
        );

        Self {
            level,
            players,
            bomb_manager: BombManager::new(settings.bomb_kick_speed),
            phase: MatchPhase::Playing,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Restore the loaded grid, full respawns and spawn positions
    pub fn play_again(&mut self) {
        self.level.reset();
        for player in &mut self.players {
            player.reset();
        }
        self.phase = MatchPhase::Playing;
        self.time_ticks = 0;
        self.events.clear();
        log::info!("Match restarted");
    }

    /// Drain events collected since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, MatchPhase::Over { .. })
    }
}

/// Spawn tile per player: configured tiles first, then the opposite corners
fn spawn_tiles(level: &Level, settings: &Settings) -> [TileCoord; PLAYER_COUNT] {
    let corners = [
        IVec2::new(1, 1),
        IVec2::new(level.width() - 2, level.height() - 2),
    ];

    let mut tiles = corners;
    for (i, tile) in tiles.iter_mut().enumerate() {
        let Some(&(x, y)) = settings.spawn_tiles.as_ref().and_then(|t| t.get(i)) else {
            continue;
        };
        let configured = IVec2::new(x, y);
        match level.get(configured) {
            Some(t) if t.is_walkable() => *tile = configured,
            _ => log::warn!(
                "Spawn tile ({}, {}) for player {} is not open floor, using ({}, {})",
                x,
                y,
                i,
                corners[i].x,
                corners[i].y
            ),
        }
    }
    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::Tile;
    use crate::tile_center;

    #[test]
    fn test_new_match_spawns_in_corners() {
        let state = MatchState::new(Level::bordered(9, 7), &Settings::default());
        assert_eq!(state.phase, MatchPhase::Playing);
        assert_eq!(state.players.len(), PLAYER_COUNT);
        assert_eq!(state.players[0].tile(), IVec2::new(1, 1));
        assert_eq!(state.players[1].tile(), IVec2::new(7, 5));
        assert_eq!(state.players[1].body.pos, tile_center(IVec2::new(7, 5)));
    }

    #[test]
    fn test_configured_spawn_tiles() {
        let settings = Settings {
            spawn_tiles: Some(vec![(3, 2), (0, 0)]),
            ..Settings::default()
        };
        let state = MatchState::new(Level::bordered(9, 7), &settings);
        assert_eq!(state.players[0].tile(), IVec2::new(3, 2));
        // Border wall is rejected
        assert_eq!(state.players[1].tile(), IVec2::new(7, 5));
    }

    #[test]
    fn test_play_again_restores_everything() {
        let mut state = MatchState::new(Level::bordered(9, 7), &Settings::default());
        let bomb_tile = state.players[0].place_bomb(&mut state.level);
        assert_eq!(bomb_tile, Some(IVec2::new(1, 1)));
        state.players[1].on_bomb_collision();
        state.phase = MatchPhase::Over { winner: Some(0) };
        state.events.push(GameEvent::MatchOver { winner: Some(0) });

        state.play_again();

        assert_eq!(state.phase, MatchPhase::Playing);
        assert_eq!(state.level.tile_at(IVec2::new(1, 1)), Tile::Empty);
        assert!(state.players[0].bomb.is_none());
        assert_eq!(state.players[1].respawns, state.players[1].max_respawns);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_take_events_drains() {
        let mut state = MatchState::new(Level::bordered(9, 7), &Settings::default());
        state.events.push(GameEvent::TileDestroyed {
            tile: IVec2::new(2, 2),
        });
        assert_eq!(state.take_events().len(), 1);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_state_serializes() {
        let state = MatchState::new(Level::bordered(5, 5), &Settings::default());
        let json = serde_json::to_string(&state).unwrap();
        let restored: MatchState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.players.len(), state.players.len());
        assert_eq!(restored.level.tiles(), state.level.tiles());
    }
}
