use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_HEALTH: i32 = 100;

/// An account that outlives individual games. A user may hold a player in
/// many games at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
        }
    }
}

/// A user's presence in one game. Created on join at a placeholder position;
/// repositioned at start and mutated by every resolved turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub x: i32,
    pub y: i32,
    pub health: i32,
    pub points: i32,
}

impl Player {
    pub fn new(user_id: Uuid, x: i32, y: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            x,
            y,
            health: MAX_HEALTH,
            points: 0,
        }
    }

    pub fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }
}
