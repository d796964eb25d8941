use serde::de::{Deserialize, Deserializer, Error as DeError};
use serde::ser::{Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

/// A numeric wire code that doesn't map to any enum variant.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("unknown {kind} code {code}")]
pub struct CodeError {
    pub kind: &'static str,
    pub code: u8,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    Ground,
    Wall,
    Gold,
    Heal,
}

impl TileKind {
    pub const ALL: [TileKind; 4] = [
        TileKind::Ground,
        TileKind::Wall,
        TileKind::Gold,
        TileKind::Heal,
    ];

    pub fn code(self) -> u8 {
        match self {
            TileKind::Ground => 0,
            TileKind::Wall => 1,
            TileKind::Gold => 2,
            TileKind::Heal => 3,
        }
    }
}

impl TryFrom<u8> for TileKind {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, CodeError> {
        match code {
            0 => Ok(TileKind::Ground),
            1 => Ok(TileKind::Wall),
            2 => Ok(TileKind::Gold),
            3 => Ok(TileKind::Heal),
            code => Err(CodeError { kind: "tile", code }),
        }
    }
}

/// One movement action per player per turn. NONE is also what the resolver
/// substitutes for a player with no recorded move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    None,
    Left,
    Right,
    Up,
    Down,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::None,
        Action::Left,
        Action::Right,
        Action::Up,
        Action::Down,
    ];

    pub fn code(self) -> u8 {
        match self {
            Action::None => 0,
            Action::Left => 1,
            Action::Right => 2,
            Action::Up => 3,
            Action::Down => 4,
        }
    }

    /// Candidate offset before clamping and wall rejection.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::None => (0, 0),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::Up => (0, -1),
            Action::Down => (0, 1),
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, CodeError> {
        match code {
            0 => Ok(Action::None),
            1 => Ok(Action::Left),
            2 => Ok(Action::Right),
            3 => Ok(Action::Up),
            4 => Ok(Action::Down),
            code => Err(CodeError {
                kind: "action",
                code,
            }),
        }
    }
}

/// Match lifecycle. Transitions are one-directional:
/// WAITING -> RUNNING -> DONE.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    Running,
    Done,
}

impl GameStatus {
    pub fn code(self) -> u8 {
        match self {
            GameStatus::Waiting => 0,
            GameStatus::Running => 1,
            GameStatus::Done => 2,
        }
    }
}

impl TryFrom<u8> for GameStatus {
    type Error = CodeError;

    fn try_from(code: u8) -> Result<Self, CodeError> {
        match code {
            0 => Ok(GameStatus::Waiting),
            1 => Ok(GameStatus::Running),
            2 => Ok(GameStatus::Done),
            code => Err(CodeError {
                kind: "state",
                code,
            }),
        }
    }
}

// The wire form carries the original integer codes, not variant names.

impl Serialize for TileKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for TileKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TileKind::try_from(u8::deserialize(deserializer)?).map_err(DeError::custom)
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Action::try_from(u8::deserialize(deserializer)?).map_err(DeError::custom)
    }
}

impl Serialize for GameStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for GameStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        GameStatus::try_from(u8::deserialize(deserializer)?).map_err(DeError::custom)
    }
}
