use std::sync::Arc;

use botbattle_rs::cli::{render_board, render_scores};
use botbattle_rs::game::{Game, GameConfig};
use botbattle_rs::service::{GameService, ServiceError};
use botbattle_rs::store::MemoryStore;
use botbattle_rs::types::{Action, GameStatus};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(name = "botbattle-sim")]
#[command(about = "Headless grid battle - seeded random bots play a full match")]
struct Args {
    /// Difficulty tier (selects board layout, ruleset, and player count)
    #[arg(long, default_value_t = 2)]
    tier: u8,

    /// Random seed for the bots
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Board width
    #[arg(long, default_value_t = 11)]
    width: i32,

    /// Board height
    #[arg(long, default_value_t = 11)]
    height: i32,

    /// Total turns before the match ends
    #[arg(long, default_value_t = 500)]
    length: u32,

    /// Print the final state as canonical JSON instead of the ASCII board
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = Arc::new(MemoryStore::new());
    let config = GameConfig {
        width: args.width,
        height: args.height,
        length: args.length,
    };
    let service = GameService::new(store, config);

    let game = match run_match(&service, &args) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&game) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error: {err}");
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", render_board(&game));
        print!("{}", render_scores(&game));
        println!("turn {} of {}, state {}", game.turn, game.length, game.state);
    }
}

fn run_match(service: &GameService, args: &Args) -> Result<Game, ServiceError> {
    let game = service.create_game(args.tier)?;
    let mut rng = StdRng::seed_from_u64(args.seed);

    // Joining to capacity starts the match
    for i in 0..game.max_players {
        let user = service.login(&format!("bot-{}", i + 1))?;
        service.join(game.id, user.id)?;
    }

    loop {
        let current = service
            .get_game(game.id, None)?
            .ok_or(ServiceError::GameNotFound(game.id))?;
        if current.state != GameStatus::Running {
            return Ok(current);
        }
        for player in &current.players {
            let action = Action::ALL.choose(&mut rng).copied().unwrap_or(Action::None);
            match service.submit_move(game.id, player.id, action) {
                Ok(_) => {}
                // The turn that just resolved may have ended the match
                Err(ServiceError::Game(botbattle_rs::GameError::NotRunning)) => break,
                Err(err) => return Err(err),
            }
        }
    }
}
