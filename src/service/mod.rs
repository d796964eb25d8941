//! Match lifecycle orchestration: join/start, the move barrier, and the
//! persistence ordering around turn resolution. This is the only mutable
//! shared surface; everything under it (resolver, generator, replay) is pure.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};
use uuid::Uuid;

use crate::game::{Game, GameConfig, GameError, Move, Player, User, replay};
use crate::store::{Store, StoreError};
use crate::types::{Action, GameStatus};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("game {0} not found")]
    GameNotFound(Uuid),
    #[error("user {0} not found")]
    UserNotFound(Uuid),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct GameService {
    config: GameConfig,
    store: Arc<dyn Store>,
    /// One mutex per game: the count-moves-then-resolve sequence in
    /// `submit_move` must be atomic per game. Different games proceed in
    /// parallel.
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl GameService {
    pub fn new(store: Arc<dyn Store>, config: GameConfig) -> Self {
        Self {
            config,
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Find a user by name, creating one on first login.
    pub fn login(&self, username: &str) -> Result<User, ServiceError> {
        if let Some(user) = self.store.find_user_by_name(username)? {
            return Ok(user);
        }
        let user = User::new(username);
        self.store.save_user(&user)?;
        info!(user = %user.id, username, "created user");
        Ok(user)
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(self.store.load_user(id)?)
    }

    /// Create a game of the given tier, or return the existing one still
    /// waiting for players at that tier.
    pub fn create_game(&self, tier: u8) -> Result<Game, ServiceError> {
        if let Some(existing) = self.store.find_waiting_game(tier)? {
            return Ok(existing);
        }

        let game = Game::new(&self.config, tier);
        self.store.save_board(game.id, &game.board)?;
        self.store.save_game_record(&game)?;
        info!(game = %game.id, tier, max_players = game.max_players, "created game");
        Ok(game)
    }

    /// Join a user into a waiting game. Idempotent per user: a repeat join
    /// returns the existing player. Starts the game once the tier-derived
    /// capacity is reached.
    pub fn join(&self, game_id: Uuid, user_id: Uuid) -> Result<Player, ServiceError> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut game = self
            .store
            .load_game(game_id)?
            .ok_or(ServiceError::GameNotFound(game_id))?;
        if self.store.load_user(user_id)?.is_none() {
            return Err(ServiceError::UserNotFound(user_id));
        }
        if let Some(existing) = game.player_for_user(user_id) {
            return Ok(existing.clone());
        }
        if game.state != GameStatus::Waiting {
            return Err(GameError::JoinClosed.into());
        }
        if game.is_full() {
            return Err(GameError::GameFull.into());
        }

        let player = game.add_player(user_id);
        self.store.save_player(game.id, &player)?;
        debug!(game = %game.id, player = %player.id, user = %user_id, "player joined");

        if game.is_full() {
            self.start(&mut game)?;
        }
        Ok(player)
    }

    /// Position the players on the fixed starting slots and open the game
    /// for moves.
    fn start(&self, game: &mut Game) -> Result<(), ServiceError> {
        game.reset()?;
        self.persist(game)?;
        info!(game = %game.id, players = game.players.len(), "game started");
        Ok(())
    }

    /// Record a move for the current turn. Idempotent per (player, turn).
    /// Once every player has a recorded move, the turn resolves exactly once
    /// and the post-turn state is committed.
    pub fn submit_move(
        &self,
        game_id: Uuid,
        player_id: Uuid,
        action: Action,
    ) -> Result<Move, ServiceError> {
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut game = self
            .store
            .load_game(game_id)?
            .ok_or(ServiceError::GameNotFound(game_id))?;
        if game.state != GameStatus::Running {
            return Err(GameError::NotRunning.into());
        }
        if game.player_by_id(player_id).is_none() {
            return Err(GameError::UnknownPlayer(player_id).into());
        }

        if let Some(existing) = self.store.find_move(game_id, player_id, game.turn)? {
            return Ok(existing);
        }

        let mv = Move::new(game_id, player_id, game.turn, action);
        self.store.append_move(&mv)?;
        debug!(game = %game_id, player = %player_id, turn = game.turn, %action, "move recorded");

        // Turn barrier: resolve only once the full move set is present
        let turn_moves = self.store.moves_for_turn(game_id, game.turn)?;
        if turn_moves.len() == game.players.len() {
            game.resolve_turn(&turn_moves);
            self.persist(&game)?;
            debug!(game = %game_id, turn = game.turn, "turn resolved");
            if game.state == GameStatus::Done {
                info!(game = %game_id, turn = game.turn, "game finished");
            }
        }
        Ok(mv)
    }

    /// The current game, or its state at a historical turn replayed from the
    /// move ledger.
    pub fn get_game(&self, game_id: Uuid, turn: Option<u32>) -> Result<Option<Game>, ServiceError> {
        let game = match self.store.load_game(game_id)? {
            Some(game) => game,
            None => return Ok(None),
        };
        match turn {
            None => Ok(Some(game)),
            Some(turn) => {
                let ledger = self.store.all_moves(game_id)?;
                Ok(Some(replay::state_at(&game, &ledger, turn)?))
            }
        }
    }

    /// Every post-turn snapshot of the game, replayed from cold storage.
    pub fn all_states(&self, game_id: Uuid) -> Result<Option<Vec<Game>>, ServiceError> {
        let game = match self.store.load_game(game_id)? {
            Some(game) => game,
            None => return Ok(None),
        };
        let ledger = self.store.all_moves(game_id)?;
        Ok(Some(replay::all_states(&game, &ledger)?))
    }

    /// Delete a game and all its history (moves, players, board).
    pub fn delete_game(&self, game_id: Uuid) -> Result<(), ServiceError> {
        // Hold the game lock through the cascade: an in-flight submit_move
        // must not persist its aggregate after the delete
        let lock = self.game_lock(game_id);
        {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.delete_game(game_id)?;
        }
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&game_id);
        info!(game = %game_id, "deleted game");
        Ok(())
    }

    /// Commit a mutated aggregate: players and tile ownership first, the
    /// game record last, so a failed write never leaves the record ahead of
    /// its sub-entities.
    fn persist(&self, game: &Game) -> Result<(), StoreError> {
        for player in &game.players {
            self.store.save_player(game.id, player)?;
        }
        self.store.save_board(game.id, &game.board)?;
        self.store.save_game_record(game)
    }

    fn game_lock(&self, game_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(game_id)
            .or_default()
            .clone()
    }
}
