//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (players by id, bombs by tile)
//! - No rendering or platform dependencies

pub mod animation;
pub mod body;
pub mod bomb;
pub mod bomb_manager;
pub mod level;
pub mod physics;
pub mod player;
pub mod ray;
pub mod state;
pub mod tick;

pub use animation::{AnimationState, Facing};
pub use body::{ContactState, MovableBodyInfo, PhysicalBody};
pub use bomb::{Bomb, BombEvent, BombState, RayReach, ray_reach};
pub use bomb_manager::BombManager;
pub use level::{Level, LevelView, Tile, TileChange, TileCoord};
pub use physics::{KickIntent, Resolution, resolve_body};
pub use player::{Player, PlayerInput, PlayerUpdate};
pub use ray::{Ray, Side};
pub use state::{GameEvent, MatchPhase, MatchState};
pub use tick::{TickInput, tick};
