//! Fixed timestep simulation tick
//!
//! One frame of a match, always in the same order:
//! input, physics, bombs, players, win check.

use super::bomb::BombEvent;
use super::physics;
use super::player::PlayerInput;
use super::state::{GameEvent, MatchPhase, MatchState};
use crate::consts::PLAYER_COUNT;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// One entry per player, by id
    pub players: [PlayerInput; PLAYER_COUNT],
    /// Pause toggle
    pub pause: bool,
}

/// Advance the match by one fixed timestep
pub fn tick(state: &mut MatchState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            MatchPhase::Playing => {
                state.phase = MatchPhase::Paused;
                log::info!("Match paused");
                return;
            }
            MatchPhase::Paused => {
                state.phase = MatchPhase::Playing;
                log::info!("Match resumed");
            }
            MatchPhase::Over { .. } => {}
        }
    }

    if state.phase != MatchPhase::Playing {
        return;
    }

    state.time_ticks += 1;

    apply_input(state, input);

    physics::update(&state.level, &mut state.players, dt);

    state
        .bomb_manager
        .update(&mut state.level, &mut state.players, dt, &mut state.events);

    update_players(state, dt);

    check_winner(state);
}

fn apply_input(state: &mut MatchState, input: &TickInput) {
    for (player, command) in state.players.iter_mut().zip(&input.players) {
        if !player.is_alive {
            continue;
        }
        player.on_move_input(command.movement);
        if command.place_bomb {
            if let Some(tile) = player.place_bomb(&mut state.level) {
                state.events.push(GameEvent::BombPlaced {
                    player: player.id,
                    tile,
                });
            }
        }
    }
}

fn update_players(state: &mut MatchState, dt: f32) {
    for player in &mut state.players {
        let update = player.update(&mut state.level, dt);

        match update.bomb_event {
            Some(BombEvent::Exploded { tile }) => {
                state.events.push(GameEvent::BombExploded {
                    owner: player.id,
                    tile,
                });
            }
            Some(BombEvent::Faded { destroyed }) => {
                state
                    .events
                    .extend(destroyed.into_iter().map(|tile| GameEvent::TileDestroyed { tile }));
            }
            None => {}
        }

        if update.eliminated {
            state
                .events
                .push(GameEvent::PlayerEliminated { player: player.id });
        }
    }
}

fn check_winner(state: &mut MatchState) {
    let mut alive = state.players.iter().filter(|p| p.is_alive).map(|p| p.id);
    let first = alive.next();
    if alive.next().is_some() {
        return;
    }

    state.phase = MatchPhase::Over { winner: first };
    state.events.push(GameEvent::MatchOver { winner: first });
    match first {
        Some(winner) => log::info!(
            "Match over after {} ticks, player {} wins",
            state.time_ticks,
            winner
        ),
        None => log::info!("Match over after {} ticks, draw", state.time_ticks),
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::level::{Level, Tile};

    fn input_for(player: usize, movement: IVec2, place_bomb: bool) -> TickInput {
        let mut input = TickInput::default();
        input.players[player] = PlayerInput {
            movement,
            place_bomb,
        };
        input
    }

    fn match_on(width: i32, height: i32, spawns: Vec<(i32, i32)>) -> MatchState {
        let settings = Settings {
            spawn_tiles: Some(spawns),
            ..Settings::default()
        };
        MatchState::new(Level::bordered(width, height), &settings)
    }

    #[test]
    fn test_tick_pause() {
        let mut state = match_on(9, 7, vec![(1, 1), (7, 5)]);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, MatchPhase::Paused);
        assert_eq!(state.time_ticks, 0);

        // Input is ignored while paused
        tick(&mut state, &input_for(0, IVec2::X, true), SIM_DT);
        assert!(state.players[0].bomb.is_none());
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, MatchPhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_place_bomb_event() {
        let mut state = match_on(9, 7, vec![(2, 3), (7, 1)]);
        tick(&mut state, &input_for(0, IVec2::ZERO, true), SIM_DT);

        assert_eq!(state.level.tile_at(IVec2::new(2, 3)), Tile::BombOccupied);
        assert_eq!(
            state.take_events(),
            vec![GameEvent::BombPlaced {
                player: 0,
                tile: IVec2::new(2, 3)
            }]
        );

        // Second bomb refused while the first is out
        tick(&mut state, &input_for(0, IVec2::ZERO, true), SIM_DT);
        assert!(state.take_events().is_empty());
    }

    #[test]
    fn test_kick_scenario() {
        let mut state = match_on(9, 7, vec![(2, 3), (7, 1)]);

        // Drop a bomb and walk left until fully inside column 1
        tick(&mut state, &input_for(0, IVec2::NEG_X, true), SIM_DT);
        for _ in 0..60 {
            if state.players[0].body.max().x < 128.0 {
                break;
            }
            tick(&mut state, &input_for(0, IVec2::NEG_X, false), SIM_DT);
        }
        assert_eq!(state.players[0].tile(), IVec2::new(1, 3));
        state.take_events();

        // Walk back into the bomb
        tick(&mut state, &input_for(0, IVec2::X, false), SIM_DT);
        let kicks: Vec<_> = state
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::BombKicked { .. }))
            .collect();
        assert_eq!(
            kicks,
            vec![GameEvent::BombKicked {
                player: 0,
                bomb_owner: 0,
                direction: IVec2::X
            }]
        );
        // The player was stopped flush against the bomb
        assert!(state.players[0].body.max().x < 128.0);

        let start = state.players[0].bomb.as_ref().unwrap().body.pos;
        tick(&mut state, &TickInput::default(), SIM_DT);
        let bomb = state.players[0].bomb.as_ref().unwrap();
        assert!(bomb.is_moving);
        assert!(bomb.body.pos.x > start.x);
        assert_eq!(bomb.body.pos.y, start.y);

        for _ in 0..120 {
            if !state.players[0].bomb.as_ref().unwrap().is_moving {
                break;
            }
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        // Stopped right before the east border
        let bomb = state.players[0].bomb.as_ref().unwrap();
        assert!(!bomb.is_moving);
        assert_eq!(bomb.tile(), IVec2::new(7, 3));
        assert_eq!(state.level.tile_at(IVec2::new(7, 3)), Tile::BombOccupied);
        assert_eq!(state.level.tile_at(IVec2::new(2, 3)), Tile::Empty);
    }

    #[test]
    fn test_damage_and_invulnerability() {
        let mut state = match_on(9, 7, vec![(2, 3), (4, 3)]);
        let settings = Settings::default();
        let full = settings.respawns;

        tick(&mut state, &input_for(0, IVec2::ZERO, true), SIM_DT);
        // Run the fuse down; nobody moves
        let fuse_ticks = (settings.detonation_time / SIM_DT).ceil() as usize + 1;
        for _ in 0..fuse_ticks {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }

        let events = state.take_events();
        assert!(events.contains(&GameEvent::BombExploded {
            owner: 0,
            tile: IVec2::new(2, 3)
        }));
        assert!(events.contains(&GameEvent::PlayerHit {
            player: 1,
            by: 0,
            respawns_left: full - 1
        }));
        assert_eq!(state.players[1].respawns, full - 1);
        assert!(!state.players[1].can_be_damaged);

        // Respawned onto (4, 3), still inside the live ray, but protected
        assert_eq!(state.players[1].tile(), IVec2::new(4, 3));
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.players[1].respawns, full - 1);
        assert!(!state.players[1].can_be_damaged);
    }

    #[test]
    fn test_chain_reaction_through_tick() {
        let mut state = match_on(11, 7, vec![(2, 3), (5, 3)]);
        // Player 1 drops first so its fuse is always ahead
        tick(&mut state, &input_for(1, IVec2::ZERO, true), SIM_DT);
        tick(&mut state, &input_for(0, IVec2::ZERO, true), SIM_DT);
        state.take_events();

        // Move both away from the row so the blasts hit nobody
        state.players[0].body.pos = crate::tile_center(IVec2::new(1, 5));
        state.players[1].body.pos = crate::tile_center(IVec2::new(9, 5));

        state.players[0]
            .bomb
            .as_mut()
            .unwrap()
            .detonate_now(&mut state.level);
        tick(&mut state, &TickInput::default(), SIM_DT);

        let events = state.take_events();
        assert!(events.contains(&GameEvent::ChainReaction {
            owner: 1,
            tile: IVec2::new(5, 3),
            triggered_by: 0
        }));
        assert!(state.players[1].is_bomb_exploding());
    }

    #[test]
    fn test_last_player_standing_wins() {
        let mut state = match_on(9, 7, vec![(1, 1), (7, 5)]);
        state.players[1].respawns = 1;
        state.players[1].on_bomb_collision();
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, MatchPhase::Over { winner: Some(0) });
        let events = state.take_events();
        assert!(events.contains(&GameEvent::PlayerEliminated { player: 1 }));
        assert!(events.contains(&GameEvent::MatchOver { winner: Some(0) }));

        // Over is terminal until play again
        tick(&mut state, &input_for(0, IVec2::X, false), SIM_DT);
        assert!(state.is_over());
        state.play_again();
        assert_eq!(state.alive_players().count(), PLAYER_COUNT);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = match_on(11, 9, vec![(1, 1), (9, 7)]);
        let mut state2 = match_on(11, 9, vec![(1, 1), (9, 7)]);

        let inputs = [
            input_for(0, IVec2::X, true),
            input_for(1, IVec2::NEG_Y, true),
            input_for(0, IVec2::new(1, 1), false),
            TickInput::default(),
        ];

        for i in 0..400 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.level.tiles(), state2.level.tiles());
        for (a, b) in state1.players.iter().zip(&state2.players) {
            assert_eq!(a.body.pos, b.body.pos);
            assert_eq!(a.respawns, b.respawns);
        }
        assert_eq!(state1.take_events(), state2.take_events());
    }
}
