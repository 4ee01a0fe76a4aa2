//! Bomberman headless runner
//!
//! Plays a bot-vs-bot match (the attract/demo mode) on a fixed timestep and
//! logs what happens. Usage: `bomberman [level-file] [settings.json]`

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use bomberman::Settings;
use bomberman::consts::*;
use bomberman::persistence::load_level;
use bomberman::sim::{GameEvent, Level, MatchPhase, MatchState, PlayerInput, TickInput, Tile, tick};

const DEMO_SEED: u64 = 0xB0_3B;
/// Give up on a match after this many rendered frames
const MAX_FRAMES: u32 = 60 * 180;

const DIRECTIONS: [IVec2; 5] = [IVec2::ZERO, IVec2::X, IVec2::NEG_X, IVec2::Y, IVec2::NEG_Y];

/// Random-walk bot: keeps a heading for a while, drops bombs now and then
struct Bot {
    heading: IVec2,
    hold_ticks: u32,
}

impl Bot {
    fn new() -> Self {
        Self {
            heading: IVec2::ZERO,
            hold_ticks: 0,
        }
    }

    fn think(&mut self, rng: &mut Pcg32) -> PlayerInput {
        if self.hold_ticks == 0 {
            self.heading = DIRECTIONS[rng.random_range(0..DIRECTIONS.len())];
            self.hold_ticks = rng.random_range(15..60);
        }
        self.hold_ticks -= 1;
        PlayerInput {
            movement: self.heading,
            place_bomb: rng.random_bool(0.01),
        }
    }
}

/// Classic arena: border, pillar grid and seeded weak walls away from spawns
fn builtin_arena(rng: &mut Pcg32) -> Level {
    let (width, height) = (13, 11);
    let mut tiles = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            let pillar = x % 2 == 0 && y % 2 == 0;
            let near_spawn = (x <= 2 && y <= 2) || (x >= width - 3 && y >= height - 3);
            let tile = if border || pillar {
                Tile::IndestructibleWall
            } else if !near_spawn && rng.random_bool(0.5) {
                Tile::WeakWall
            } else {
                Tile::Empty
            };
            tiles.push(tile);
        }
    }
    Level::new(width, height, tiles)
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::BombPlaced { player, tile } => {
            log::debug!("player {} placed a bomb at ({}, {})", player, tile.x, tile.y)
        }
        GameEvent::BombKicked { player, bomb_owner, .. } => {
            log::debug!("player {} kicked the bomb of player {}", player, bomb_owner)
        }
        GameEvent::BombExploded { owner, tile } => {
            log::debug!("bomb of player {} exploded at ({}, {})", owner, tile.x, tile.y)
        }
        GameEvent::ChainReaction { owner, triggered_by, .. } => {
            log::debug!("player {} set off the bomb of player {}", triggered_by, owner)
        }
        GameEvent::TileDestroyed { tile } => {
            log::trace!("wall at ({}, {}) destroyed", tile.x, tile.y)
        }
        GameEvent::PlayerHit {
            player,
            by,
            respawns_left,
        } => log::info!("player {} hit by player {}, {} left", player, by, respawns_left),
        GameEvent::PlayerEliminated { player } => log::info!("player {} is out", player),
        GameEvent::MatchOver { winner } => log::info!("match over, winner {:?}", winner),
    }
}

fn main() {
    env_logger::init();
    log::info!("Bomberman (headless) starting...");

    let mut args = std::env::args().skip(1);
    let level_path = args.next();
    let settings_path = args.next();

    let settings = match settings_path {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    let mut rng = Pcg32::seed_from_u64(DEMO_SEED);
    let level = match level_path {
        Some(path) => match load_level(&path) {
            Ok(level) => level,
            Err(e) => {
                log::error!("Cannot start: {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => builtin_arena(&mut rng),
    };

    let mut state = MatchState::new(level, &settings);
    let mut bots = [Bot::new(), Bot::new()];
    let mut accumulator = 0.0_f32;
    let mut frames = 0;
    let mut bombs = 0;
    let mut walls = 0;

    while !state.is_over() && frames < MAX_FRAMES {
        // Jittered frame time, like a real display loop
        let dt: f32 = rng.random_range(0.012..0.022);
        accumulator += dt.min(0.1);

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut input = TickInput::default();
            for (slot, bot) in input.players.iter_mut().zip(bots.iter_mut()) {
                *slot = bot.think(&mut rng);
            }
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;
        }

        // Nothing draws; drop the grid changes
        state.level.take_changes();
        for event in state.take_events() {
            match event {
                GameEvent::BombPlaced { .. } => bombs += 1,
                GameEvent::TileDestroyed { .. } => walls += 1,
                _ => {}
            }
            log_event(&event);
        }
        frames += 1;
    }

    println!("\nMatch summary");
    println!("  ticks simulated: {}", state.time_ticks);
    println!("  bombs placed:    {}", bombs);
    println!("  walls destroyed: {}", walls);
    for player in &state.players {
        println!(
            "  player {}: {} of {} respawns left{}",
            player.id,
            player.respawns,
            player.max_respawns,
            if player.is_alive { "" } else { " (eliminated)" }
        );
    }
    match state.phase {
        MatchPhase::Over { winner: Some(id) } => println!("  winner: player {}", id),
        MatchPhase::Over { winner: None } => println!("  result: draw"),
        _ => println!("  result: time limit reached"),
    }
}
