//! Bomb timer state machine, kick movement and explosion rays
//!
//! A bomb waits out its fuse, explodes into four rays, keeps the rays on
//! screen for a while and then fades. Weak walls reached by a ray are only
//! destroyed when the bomb fades, so walls vanish together with the blast.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::animation::AnimationState;
use super::body::PhysicalBody;
use super::level::{Level, Tile, TileCoord};
use super::ray::{Ray, Side};
use crate::consts::{MAX_RAY_LENGTH, TILE_SIZE};
use crate::tile_center;

/// Bomb lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BombState {
    WaitingForExplosion,
    /// Rays are live and deal damage
    Exploding,
    /// Terminal; the owner drops the bomb
    Exploded,
}

/// State transition reported by [`Bomb::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BombEvent {
    Exploded { tile: TileCoord },
    /// Rays faded; queued walls were destroyed
    Faded { destroyed: Vec<TileCoord> },
}

/// How far a ray reaches from its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayReach {
    pub length: u32,
    /// Weak wall at the end of the ray, destroyed when the bomb fades
    pub destroy: Option<TileCoord>,
}

/// Scan outward from `origin` and find the ray length on `side`
///
/// Walkable tiles extend the ray up to `MAX_RAY_LENGTH`. A weak wall or
/// another bomb directly past the walkable run is covered as well; a weak
/// wall is queued for destruction. Anything else caps the ray.
pub fn ray_reach(level: &Level, origin: TileCoord, side: Side) -> RayReach {
    let delta = side.delta();
    let mut length = 0;
    let mut blocker = None;

    for i in 1..=MAX_RAY_LENGTH {
        let coord = origin + delta * i as i32;
        match level.get(coord) {
            Some(tile) if tile.is_walkable() => length = i,
            Some(tile) => {
                blocker = Some((coord, tile));
                break;
            }
            None => break,
        }
    }

    let mut destroy = None;
    if let Some((coord, tile)) = blocker {
        if tile.is_weak_wall() {
            length += 1;
            destroy = Some(coord);
        } else if tile == Tile::BombOccupied {
            length += 1;
        }
    }

    RayReach { length, destroy }
}

/// A placed bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    /// Index of the owning player
    pub owner: usize,
    pub body: PhysicalBody,
    pub state: BombState,
    /// Kick direction (unit grid step, zero when never kicked)
    pub direction: IVec2,
    pub is_moving: bool,
    /// Fuse length in seconds
    pub detonation_time: f32,
    /// How long rays stay live after detonation, in seconds
    pub ray_on_screen_time: f32,
    /// Seconds since placement
    elapsed: f32,
    /// Seconds since detonation
    exploding_elapsed: f32,
    /// Weak walls reached by the rays, destroyed on fade
    tiles_to_destroy: Vec<TileCoord>,
    /// Slot per `Side`, populated while exploding
    rays: [Option<Ray>; 4],
}

impl Bomb {
    pub fn new(
        owner: usize,
        tile: TileCoord,
        detonation_time: f32,
        ray_on_screen_time: f32,
    ) -> Self {
        Self {
            owner,
            body: PhysicalBody::new(tile_center(tile), Vec2::splat(TILE_SIZE)),
            state: BombState::WaitingForExplosion,
            direction: IVec2::ZERO,
            is_moving: false,
            detonation_time,
            ray_on_screen_time,
            elapsed: 0.0,
            exploding_elapsed: 0.0,
            tiles_to_destroy: Vec::new(),
            rays: Default::default(),
        }
    }

    /// Tile holding the bomb centre
    #[inline]
    pub fn tile(&self) -> TileCoord {
        self.body.tile_coords()
    }

    /// Tile the bomb would enter next while kicked
    #[inline]
    pub fn next_tile(&self) -> TileCoord {
        self.tile() + self.direction
    }

    /// Seconds left on the fuse
    pub fn fuse_remaining(&self) -> f32 {
        (self.detonation_time - self.elapsed).max(0.0)
    }

    /// Snap to the centre of the current tile
    pub fn fix_position(&mut self) {
        self.body.pos = tile_center(self.tile());
    }

    /// Start sliding along `direction` (a kick)
    pub fn set_move_direction(&mut self, direction: IVec2, speed: f32) {
        self.direction = direction;
        self.body.vel = direction.as_vec2() * speed;
        self.is_moving = true;
    }

    pub fn stop_moving(&mut self) {
        self.is_moving = false;
        self.body.vel = Vec2::ZERO;
    }

    /// Slide along the kick velocity for one frame
    pub fn advance(&mut self, dt: f32) {
        self.body.pos += self.body.vel * dt;
    }

    /// Advance timers; returns the transition taken this frame, if any
    pub fn update(&mut self, level: &mut Level, dt: f32) -> Option<BombEvent> {
        match self.state {
            BombState::WaitingForExplosion => {
                self.elapsed += dt;
                if self.elapsed >= self.detonation_time {
                    self.explode(level);
                    return Some(BombEvent::Exploded { tile: self.tile() });
                }
            }
            BombState::Exploding => {
                self.exploding_elapsed += dt;
                if self.exploding_elapsed >= self.ray_on_screen_time {
                    let destroyed = self.fade(level);
                    return Some(BombEvent::Faded { destroyed });
                }
            }
            BombState::Exploded => {}
        }
        None
    }

    /// Skip the rest of the fuse (chain reaction); false if already exploded
    pub fn detonate_now(&mut self, level: &mut Level) -> bool {
        if self.state != BombState::WaitingForExplosion {
            return false;
        }
        self.elapsed = self.detonation_time;
        self.explode(level);
        true
    }

    fn explode(&mut self, level: &mut Level) {
        self.stop_moving();
        self.fix_position();
        let origin = self.tile();
        level.destroy_tile(origin);

        for side in Side::ALL {
            let reach = ray_reach(level, origin, side);
            if let Some(coord) = reach.destroy {
                self.tiles_to_destroy.push(coord);
            }
            self.rays[side.slot()] = Some(Ray::new(side, origin, reach.length));
        }

        self.exploding_elapsed = 0.0;
        self.state = BombState::Exploding;
        log::info!(
            "Bomb of player {} exploded at ({}, {}), {} walls queued",
            self.owner,
            origin.x,
            origin.y,
            self.tiles_to_destroy.len()
        );
    }

    fn fade(&mut self, level: &mut Level) -> Vec<TileCoord> {
        self.state = BombState::Exploded;
        self.rays = Default::default();
        self.tiles_to_destroy
            .drain(..)
            .filter(|&coord| level.destroy_tile(coord))
            .collect()
    }

    /// Live rays (empty unless exploding)
    pub fn rays(&self) -> impl Iterator<Item = &Ray> {
        self.rays.iter().flatten()
    }

    pub fn ray(&self, side: Side) -> Option<&Ray> {
        self.rays[side.slot()].as_ref()
    }

    /// Walls that will be destroyed when the blast fades
    pub fn queued_destruction(&self) -> &[TileCoord] {
        &self.tiles_to_destroy
    }

    /// `body` is inside the blast (bomb tile or any ray)
    pub fn is_object_in_ray(&self, body: &PhysicalBody) -> bool {
        if self.state != BombState::Exploding {
            return false;
        }
        self.body.is_collision(body) || self.rays().any(|ray| ray.is_collision(body))
    }

    pub fn animation_state(&self) -> AnimationState {
        match self.state {
            BombState::WaitingForExplosion => AnimationState::BombFuse,
            BombState::Exploding | BombState::Exploded => AnimationState::Explosion,
        }
    }
}
