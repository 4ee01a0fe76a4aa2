//! Player entity: movement, bomb ownership, respawns and invulnerability

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::animation::{AnimationState, Facing};
use super::body::{MovableBodyInfo, PhysicalBody};
use super::bomb::{Bomb, BombEvent, BombState};
use super::level::{Level, TileCoord};
use super::physics::KickIntent;
use crate::settings::Settings;
use crate::tile_center;

/// Per-frame input for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    /// Discretized direction, each axis in -1..=1
    pub movement: IVec2,
    /// Place-bomb button pressed this frame (edge triggered)
    pub place_bomb: bool,
}

/// What happened to a player during `Player::update`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerUpdate {
    pub bomb_event: Option<BombEvent>,
    /// Ran out of respawns this frame
    pub eliminated: bool,
}

/// A player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Index in the match (also iteration order)
    pub id: usize,
    pub body: PhysicalBody,
    /// Tile footprint from the last physics pass
    pub info: MovableBodyInfo,
    /// Remaining respawns; the player is eliminated at zero
    pub respawns: u32,
    pub max_respawns: u32,
    pub is_alive: bool,
    /// False during the post-respawn safety window
    pub can_be_damaged: bool,
    /// Seconds since the last respawn
    respawn_clock: f32,
    pub respawn_safe_time: f32,
    pub respawn_tile: TileCoord,
    /// Walking speed in pixels per second
    pub speed: f32,
    /// Pending push on a bomb, consumed by the bomb manager
    pub kick: Option<KickIntent>,
    /// At most one bomb at a time
    pub bomb: Option<Bomb>,
    pub facing: Facing,
    detonation_time: f32,
    ray_on_screen_time: f32,
}

impl Player {
    pub fn new(id: usize, respawn_tile: TileCoord, settings: &Settings) -> Self {
        let body = PhysicalBody::new(
            tile_center(respawn_tile),
            Vec2::new(settings.player_size.0, settings.player_size.1),
        );
        Self {
            id,
            info: MovableBodyInfo::from_body(&body),
            body,
            respawns: settings.respawns,
            max_respawns: settings.respawns,
            is_alive: true,
            can_be_damaged: true,
            respawn_clock: 0.0,
            respawn_safe_time: settings.respawn_safe_time,
            respawn_tile,
            speed: settings.player_speed,
            kick: None,
            bomb: None,
            facing: Facing::default(),
            detonation_time: settings.detonation_time,
            ray_on_screen_time: settings.ray_on_screen_time,
        }
    }

    /// Tile holding the player centre
    #[inline]
    pub fn tile(&self) -> TileCoord {
        self.body.tile_coords()
    }

    /// Set velocity from a movement intent
    pub fn on_move_input(&mut self, direction: IVec2) {
        if !self.is_alive {
            return;
        }
        self.body.vel = direction.clamp(IVec2::NEG_ONE, IVec2::ONE).as_vec2() * self.speed;
    }

    /// Drop a bomb on the current tile; `None` if one is already out
    pub fn place_bomb(&mut self, level: &mut Level) -> Option<TileCoord> {
        if !self.is_alive || self.bomb.is_some() {
            return None;
        }
        let tile = self.tile();
        level.mark_bomb(tile);
        self.bomb = Some(Bomb::new(
            self.id,
            tile,
            self.detonation_time,
            self.ray_on_screen_time,
        ));
        log::debug!("Player {} placed bomb at ({}, {})", self.id, tile.x, tile.y);
        Some(tile)
    }

    /// Held bomb still on its fuse
    pub fn has_bomb(&self) -> bool {
        self.bomb
            .as_ref()
            .is_some_and(|b| b.state == BombState::WaitingForExplosion)
    }

    pub fn is_bomb_exploding(&self) -> bool {
        self.bomb
            .as_ref()
            .is_some_and(|b| b.state == BombState::Exploding)
    }

    /// Apply the movement granted by physics and advance timers
    pub fn update(&mut self, level: &mut Level, dt: f32) -> PlayerUpdate {
        let mut result = PlayerUpdate::default();

        if self.is_alive {
            let mut movement = self.body.movement;
            if movement.x != 0.0 && movement.y != 0.0 {
                movement *= std::f32::consts::FRAC_1_SQRT_2;
            }
            if let Some(facing) = Facing::from_movement(movement) {
                self.facing = facing;
            }
            self.body.pos += movement;
            self.body.movement = movement;
        }

        if let Some(bomb) = self.bomb.as_mut() {
            result.bomb_event = bomb.update(level, dt);
            if bomb.state == BombState::Exploded {
                self.bomb = None;
            }
        }

        if !self.can_be_damaged {
            self.respawn_clock += dt;
            if self.respawn_clock >= self.respawn_safe_time {
                self.can_be_damaged = true;
            }
        }

        if self.respawns == 0 && self.is_alive {
            self.eliminate();
            result.eliminated = true;
        }

        result
    }

    /// Hit by a blast; returns true if the hit cost a respawn
    pub fn on_bomb_collision(&mut self) -> bool {
        if !self.is_alive || !self.can_be_damaged {
            return false;
        }
        self.respawn();
        true
    }

    /// Teleport to the respawn tile centre
    pub fn spawn(&mut self) {
        self.body.pos = tile_center(self.respawn_tile);
        self.body.movement = Vec2::ZERO;
        self.info = MovableBodyInfo::from_body(&self.body);
    }

    fn respawn(&mut self) {
        self.can_be_damaged = false;
        self.spawn();
        self.respawns = self.respawns.saturating_sub(1);
        self.respawn_clock = 0.0;
        log::info!("Player {} hit, {} respawns left", self.id, self.respawns);
    }

    fn eliminate(&mut self) {
        self.body.vel = Vec2::ZERO;
        self.body.movement = Vec2::ZERO;
        self.kick = None;
        self.is_alive = false;
        log::info!("Player {} eliminated", self.id);
    }

    /// Restore full respawns and position for a new round
    pub fn reset(&mut self) {
        self.respawns = self.max_respawns;
        self.is_alive = true;
        self.can_be_damaged = true;
        self.respawn_clock = 0.0;
        self.kick = None;
        self.bomb = None;
        self.body.vel = Vec2::ZERO;
        self.facing = Facing::default();
        self.spawn();
    }

    /// Player footprint covers `coord` on both axes
    pub fn occupies_tile(&self, coord: TileCoord) -> bool {
        self.info.spans_column(coord.x) && self.info.spans_row(coord.y)
    }

    pub fn animation_state(&self) -> AnimationState {
        if self.body.movement == Vec2::ZERO {
            return AnimationState::Idle;
        }
        AnimationState::Walk {
            facing: self.facing,
            with_bomb: self.bomb.is_none(),
        }
    }
}
