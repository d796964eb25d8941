#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod game;
pub mod service;
pub mod store;
pub mod types;

pub use board::{Board, Tile};
pub use game::{Game, GameConfig, GameError, Move, Player, User};
pub use service::{GameService, ServiceError};
pub use store::{MemoryStore, Store, StoreError};
pub use types::{Action, GameStatus, TileKind};
