//! Named animation states handed to the animation collaborator
//!
//! The simulation only decides *which* state is active; frame timing and
//! atlas layout belong to whoever draws.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Direction a player sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    North,
    #[default]
    South,
    East,
    West,
}

impl Facing {
    /// Facing for a movement delta; vertical movement wins on diagonals
    pub fn from_movement(movement: Vec2) -> Option<Self> {
        if movement.y < 0.0 {
            Some(Facing::North)
        } else if movement.y > 0.0 {
            Some(Facing::South)
        } else if movement.x < 0.0 {
            Some(Facing::West)
        } else if movement.x > 0.0 {
            Some(Facing::East)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::North => "NORTH",
            Facing::South => "SOUTH",
            Facing::East => "EAST",
            Facing::West => "WEST",
        }
    }
}

/// Animation state of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    /// Walking; `with_bomb` while the player still carries an unplaced bomb
    Walk { facing: Facing, with_bomb: bool },
    /// Standing still (the collaborator pauses the current strip)
    Idle,
    /// Placed bomb, fuse burning
    BombFuse,
    /// Explosion rays
    Explosion,
}

impl AnimationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationState::Walk {
                facing,
                with_bomb: false,
            } => facing.as_str(),
            AnimationState::Walk {
                facing,
                with_bomb: true,
            } => match facing {
                Facing::North => "NORTH_WITH_BOMB",
                Facing::South => "SOUTH_WITH_BOMB",
                Facing::East => "EAST_WITH_BOMB",
                Facing::West => "WEST_WITH_BOMB",
            },
            AnimationState::Idle => "IDLE",
            AnimationState::BombFuse => "waitingForExplosion",
            AnimationState::Explosion => "explosion",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_prefers_vertical() {
        assert_eq!(Facing::from_movement(Vec2::new(1.0, -1.0)), Some(Facing::North));
        assert_eq!(Facing::from_movement(Vec2::new(-2.0, 0.0)), Some(Facing::West));
        assert_eq!(Facing::from_movement(Vec2::ZERO), None);
    }

    #[test]
    fn test_state_names() {
        let walk = AnimationState::Walk {
            facing: Facing::East,
            with_bomb: false,
        };
        assert_eq!(walk.as_str(), "EAST");
        let carrying = AnimationState::Walk {
            facing: Facing::North,
            with_bomb: true,
        };
        assert_eq!(carrying.as_str(), "NORTH_WITH_BOMB");
        assert_eq!(AnimationState::Explosion.as_str(), "explosion");
    }
}
