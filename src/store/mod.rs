//! Persistence collaborator for the simulation core: typed per-entity
//! load/save with parent-child cascade delete. The core treats every call as
//! a fallible external operation.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::board::Board;
use crate::game::{Game, Move, Player, User};
use crate::types::GameStatus;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
    #[error("inconsistent store: {0}")]
    Inconsistent(&'static str),
}

/// Keyed entity storage. A `Game` aggregate is stored as a game record plus
/// its board (with tile ownership), its players in join order, and its
/// append-only move ledger; `load_game` reassembles the aggregate.
pub trait Store: Send + Sync {
    fn load_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    fn find_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn save_user(&self, user: &User) -> Result<(), StoreError>;

    fn load_game(&self, id: Uuid) -> Result<Option<Game>, StoreError>;
    fn find_waiting_game(&self, tier: u8) -> Result<Option<Game>, StoreError>;
    /// Write the game record itself (state, turn). Dependent sub-entities
    /// must already be saved: callers write players and the board first so a
    /// failure never leaves the record ahead of its children.
    fn save_game_record(&self, game: &Game) -> Result<(), StoreError>;
    fn load_board(&self, board_id: Uuid) -> Result<Option<Board>, StoreError>;
    fn save_board(&self, game_id: Uuid, board: &Board) -> Result<(), StoreError>;
    /// Players for a game, in join order.
    fn load_players(&self, game_id: Uuid) -> Result<Vec<Player>, StoreError>;
    fn save_player(&self, game_id: Uuid, player: &Player) -> Result<(), StoreError>;

    fn append_move(&self, mv: &Move) -> Result<(), StoreError>;
    fn find_move(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        turn: u32,
    ) -> Result<Option<Move>, StoreError>;
    fn moves_for_turn(&self, game_id: Uuid, turn: u32) -> Result<Vec<Move>, StoreError>;
    fn all_moves(&self, game_id: Uuid) -> Result<Vec<Move>, StoreError>;

    /// Remove the game and everything under it: moves, players, tiles/board,
    /// then the game record.
    fn delete_game(&self, id: Uuid) -> Result<(), StoreError>;
}

/// The game row without its children.
#[derive(Debug, Clone)]
struct GameRecord {
    id: Uuid,
    board_id: Uuid,
    tier: u8,
    max_players: usize,
    turn: u32,
    length: u32,
    state: GameStatus,
}

impl GameRecord {
    fn from_game(game: &Game) -> Self {
        Self {
            id: game.id,
            board_id: game.board.id,
            tier: game.tier,
            max_players: game.max_players,
            turn: game.turn,
            length: game.length,
            state: game.state,
        }
    }
}

/// In-process store used by the binary and the tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    games: RwLock<HashMap<Uuid, GameRecord>>,
    boards: RwLock<HashMap<Uuid, Board>>,
    /// Players per game, kept in join order.
    players: RwLock<HashMap<Uuid, Vec<Player>>>,
    /// Move ledger per game, append-only.
    moves: RwLock<HashMap<Uuid, Vec<Move>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn assemble(&self, record: &GameRecord) -> Result<Game, StoreError> {
        let board = self
            .load_board(record.board_id)?
            .ok_or(StoreError::Inconsistent("game record without a board"))?;
        let players = self.load_players(record.id)?;
        Ok(Game {
            id: record.id,
            board,
            players,
            tier: record.tier,
            max_players: record.max_players,
            turn: record.turn,
            length: record.length,
            state: record.state,
        })
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read().map_err(|_| StoreError::Poisoned)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write().map_err(|_| StoreError::Poisoned)
}

impl Store for MemoryStore {
    fn load_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.get(&id).cloned())
    }

    fn find_user_by_name(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn save_user(&self, user: &User) -> Result<(), StoreError> {
        write(&self.users)?.insert(user.id, user.clone());
        Ok(())
    }

    fn load_game(&self, id: Uuid) -> Result<Option<Game>, StoreError> {
        let record = match read(&self.games)?.get(&id).cloned() {
            Some(record) => record,
            None => return Ok(None),
        };
        self.assemble(&record).map(Some)
    }

    fn find_waiting_game(&self, tier: u8) -> Result<Option<Game>, StoreError> {
        let record = read(&self.games)?
            .values()
            .find(|r| r.state == GameStatus::Waiting && r.tier == tier)
            .cloned();
        match record {
            Some(record) => self.assemble(&record).map(Some),
            None => Ok(None),
        }
    }

    fn save_game_record(&self, game: &Game) -> Result<(), StoreError> {
        write(&self.games)?.insert(game.id, GameRecord::from_game(game));
        Ok(())
    }

    fn load_board(&self, board_id: Uuid) -> Result<Option<Board>, StoreError> {
        Ok(read(&self.boards)?.get(&board_id).cloned())
    }

    fn save_board(&self, _game_id: Uuid, board: &Board) -> Result<(), StoreError> {
        write(&self.boards)?.insert(board.id, board.clone());
        Ok(())
    }

    fn load_players(&self, game_id: Uuid) -> Result<Vec<Player>, StoreError> {
        Ok(read(&self.players)?.get(&game_id).cloned().unwrap_or_default())
    }

    fn save_player(&self, game_id: Uuid, player: &Player) -> Result<(), StoreError> {
        let mut players = write(&self.players)?;
        let roster = players.entry(game_id).or_default();
        match roster.iter_mut().find(|p| p.id == player.id) {
            Some(existing) => *existing = player.clone(),
            None => roster.push(player.clone()),
        }
        Ok(())
    }

    fn append_move(&self, mv: &Move) -> Result<(), StoreError> {
        write(&self.moves)?.entry(mv.game_id).or_default().push(*mv);
        Ok(())
    }

    fn find_move(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        turn: u32,
    ) -> Result<Option<Move>, StoreError> {
        Ok(read(&self.moves)?.get(&game_id).and_then(|ledger| {
            ledger
                .iter()
                .find(|m| m.player_id == player_id && m.turn == turn)
                .copied()
        }))
    }

    fn moves_for_turn(&self, game_id: Uuid, turn: u32) -> Result<Vec<Move>, StoreError> {
        Ok(read(&self.moves)?
            .get(&game_id)
            .map(|ledger| ledger.iter().filter(|m| m.turn == turn).copied().collect())
            .unwrap_or_default())
    }

    fn all_moves(&self, game_id: Uuid) -> Result<Vec<Move>, StoreError> {
        Ok(read(&self.moves)?.get(&game_id).cloned().unwrap_or_default())
    }

    fn delete_game(&self, id: Uuid) -> Result<(), StoreError> {
        write(&self.moves)?.remove(&id);
        write(&self.players)?.remove(&id);
        if let Some(record) = write(&self.games)?.remove(&id) {
            write(&self.boards)?.remove(&record.board_id);
        }
        Ok(())
    }
}
