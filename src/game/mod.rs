pub mod action;
pub mod players;
pub mod replay;
pub mod state;

pub use action::Move;
pub use players::{MAX_HEALTH, Player, User};
pub use state::{
    ATTACK_DAMAGE, CAPTURE_COST, Game, GameConfig, GameError, HEAL_AMOUNT, RACE_WIN_POINTS,
    TERRITORY_TIER, max_players_for,
};
