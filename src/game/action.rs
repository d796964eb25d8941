use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Action;

/// One recorded move in a game's append-only ledger. At most one move exists
/// per (game, player, turn); it is immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub id: Uuid,
    #[serde(rename = "gameId")]
    pub game_id: Uuid,
    #[serde(rename = "playerId")]
    pub player_id: Uuid,
    pub turn: u32,
    pub action: Action,
}

impl Move {
    pub fn new(game_id: Uuid, player_id: Uuid, turn: u32, action: Action) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            player_id,
            turn,
            action,
        }
    }
}
