use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::Board;
use crate::game::action::Move;
use crate::game::players::{MAX_HEALTH, Player};
use crate::types::{Action, GameStatus, TileKind};

/// Tiers below this play the race ruleset; this tier and above play the
/// territory ruleset.
pub const TERRITORY_TIER: u8 = 2;

pub const ATTACK_DAMAGE: i32 = 20;
pub const CAPTURE_COST: i32 = 20;
pub const HEAL_AMOUNT: i32 = 20;
pub const RACE_WIN_POINTS: i32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    pub length: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 11,
            height: 11,
            length: 500,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game is not accepting players")]
    JoinClosed,
    #[error("game is full")]
    GameFull,
    #[error("game is not running")]
    NotRunning,
    #[error("player {0} is not in this game")]
    UnknownPlayer(Uuid),
    #[error("{0} players joined but only 4 starting slots exist")]
    TooManyPlayers(usize),
}

/// The authoritative match aggregate. Turn resolution is the only thing that
/// mutates the board and the players once the game is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub board: Board,
    pub players: Vec<Player>,
    #[serde(rename = "difficulty")]
    pub tier: u8,
    #[serde(rename = "maxPlayers")]
    pub max_players: usize,
    pub turn: u32,
    pub length: u32,
    pub state: GameStatus,
}

/// Player capacity derived from the difficulty tier.
pub fn max_players_for(tier: u8) -> usize {
    if tier > 4 {
        3
    } else if tier > 1 {
        2
    } else {
        1
    }
}

impl Game {
    pub fn new(config: &GameConfig, tier: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            board: Board::generate(config.width, config.height, tier),
            players: Vec::new(),
            tier,
            max_players: max_players_for(tier),
            turn: 0,
            length: config.length,
            state: GameStatus::Waiting,
        }
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players
    }

    pub fn player_by_id(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_for_user(&self, user_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    /// Append a player for the user at the placeholder position. Join order
    /// is significant: it assigns the starting slot.
    pub fn add_player(&mut self, user_id: Uuid) -> Player {
        let player = Player::new(user_id, 0, 0);
        self.players.push(player.clone());
        player
    }

    /// Starting slots in join order: west, east, north, south mid-edges.
    pub fn starting_positions(&self) -> [(i32, i32); 4] {
        let cx = self.board.width / 2;
        let cy = self.board.height / 2;
        [
            (0, cy),
            (self.board.width - 1, cy),
            (cx, 0),
            (cx, self.board.height - 1),
        ]
    }

    /// Put the game in its turn-0 running state: players on their starting
    /// slots with full health and no points, all gold released.
    pub fn reset(&mut self) -> Result<(), GameError> {
        let slots = self.starting_positions();
        if self.players.len() > slots.len() {
            return Err(GameError::TooManyPlayers(self.players.len()));
        }

        for (player, (x, y)) in self.players.iter_mut().zip(slots) {
            player.x = x;
            player.y = y;
            player.health = MAX_HEALTH;
            player.points = 0;
        }

        self.board.clear_owners();
        self.turn = 0;
        self.state = GameStatus::Running;
        Ok(())
    }

    /// Resolve one turn from the recorded moves. Total and deterministic:
    /// players without a move act as NONE, and the phases always run to
    /// completion in order (movement, tile interaction, death and respawn,
    /// turn advance).
    pub fn resolve_turn(&mut self, moves: &[Move]) {
        let actions: HashMap<Uuid, Action> =
            moves.iter().map(|m| (m.player_id, m.action)).collect();

        self.apply_movement(&actions);
        if self.tier < TERRITORY_TIER {
            self.race_interaction();
        } else {
            self.territory_interaction();
        }
        self.resolve_deaths();

        self.turn += 1;
        if self.turn == self.length {
            self.state = GameStatus::Done;
        }
    }

    /// Movement is logically simultaneous: every candidate cell is computed
    /// from the pre-turn position before any position is written.
    fn apply_movement(&mut self, actions: &HashMap<Uuid, Action>) {
        let candidates: Vec<(i32, i32)> = self
            .players
            .iter()
            .map(|player| {
                let action = actions.get(&player.id).copied().unwrap_or(Action::None);
                let (dx, dy) = action.delta();
                (
                    (player.x + dx).clamp(0, self.board.width - 1),
                    (player.y + dy).clamp(0, self.board.height - 1),
                )
            })
            .collect();

        for (player, (x, y)) in self.players.iter_mut().zip(candidates) {
            if self.board.tile_at(x, y).kind != TileKind::Wall {
                player.x = x;
                player.y = y;
            }
        }
    }

    /// Tier < 2: first player to reach an unclaimed gold tile wins outright.
    fn race_interaction(&mut self) {
        for idx in 0..self.players.len() {
            let (x, y) = (self.players[idx].x, self.players[idx].y);
            let tile = self.board.tile_at(x, y);
            if tile.kind == TileKind::Gold && tile.owner.is_none() {
                let id = self.players[idx].id;
                self.board.set_owner(x, y, Some(id));
                self.players[idx].points = RACE_WIN_POINTS;
                self.state = GameStatus::Done;
            }
        }
    }

    /// Tier >= 2: shared cells deal pairwise damage, lone players capture
    /// gold at a health cost or heal, and held gold pays out each turn.
    fn territory_interaction(&mut self) {
        for idx in 0..self.players.len() {
            let (x, y) = (self.players[idx].x, self.players[idx].y);
            let kind = self.board.tile_at(x, y).kind;

            let mut alone = true;
            for other in 0..self.players.len() {
                if other == idx || !self.players[other].is_at(x, y) {
                    continue;
                }
                alone = false;
                // No attacking on a heal tile
                if kind != TileKind::Heal {
                    self.players[other].health -= ATTACK_DAMAGE;
                }
            }

            let owner = self.board.tile_at(x, y).owner;
            let id = self.players[idx].id;
            if alone && kind == TileKind::Gold && owner != Some(id) {
                // The capture cost applies even when the capture fails
                self.players[idx].health -= CAPTURE_COST;
                if self.players[idx].health > 0 {
                    self.board.set_owner(x, y, Some(id));
                }
            } else if kind == TileKind::Heal {
                let player = &mut self.players[idx];
                player.health = (player.health + HEAL_AMOUNT).min(MAX_HEALTH);
            }
        }

        // Income from held territory
        let owners: Vec<Uuid> = self.board.gold_tiles().filter_map(|t| t.owner).collect();
        for owner in owners {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == owner) {
                player.points += 1;
            }
        }
    }

    /// A dead player releases all held gold and respawns at full health on
    /// the heal tile nearest (Manhattan) to where they died.
    fn resolve_deaths(&mut self) {
        for idx in 0..self.players.len() {
            if self.players[idx].health > 0 {
                continue;
            }
            let id = self.players[idx].id;
            self.board.release_gold(id);

            let (x, y) = (self.players[idx].x, self.players[idx].y);
            if let Some((hx, hy)) = self.board.nearest_heal(x, y) {
                self.players[idx].x = hx;
                self.players[idx].y = hy;
            }
            self.players[idx].health = MAX_HEALTH;
        }
    }
}
