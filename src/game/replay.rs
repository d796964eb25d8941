//! Read-side reconstruction of historical turns from the persisted move
//! ledger. Never touches the authoritative game: every function clones,
//! resets to the turn-0 state, and re-runs the resolver.

use crate::game::action::Move;
use crate::game::state::{Game, GameError};

/// The game as it stood after resolving turns 0..=`target_turn`, re-derived
/// purely from the board layout and the move ledger.
pub fn state_at(game: &Game, ledger: &[Move], target_turn: u32) -> Result<Game, GameError> {
    let mut replayed = game.clone();
    replayed.reset()?;
    for turn in 0..=target_turn {
        replayed.resolve_turn(&moves_for_turn(ledger, turn));
    }
    Ok(replayed)
}

/// Post-turn snapshots for every turn 0..=`game.turn`; element `t` equals
/// `state_at(game, ledger, t)`.
pub fn all_states(game: &Game, ledger: &[Move]) -> Result<Vec<Game>, GameError> {
    let mut replayed = game.clone();
    replayed.reset()?;

    let mut states = Vec::with_capacity(game.turn as usize + 1);
    for turn in 0..=game.turn {
        replayed.resolve_turn(&moves_for_turn(ledger, turn));
        states.push(replayed.clone());
    }
    Ok(states)
}

fn moves_for_turn(ledger: &[Move], turn: u32) -> Vec<Move> {
    ledger.iter().filter(|m| m.turn == turn).copied().collect()
}
