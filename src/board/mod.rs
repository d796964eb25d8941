use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TileKind;

/// A single board cell. `owner` is only ever set on GOLD tiles, and only by
/// turn resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: TileKind,
    #[serde(rename = "ownerId")]
    pub owner: Option<Uuid>,
}

impl Tile {
    pub fn new(x: i32, y: i32, kind: TileKind) -> Self {
        Self {
            x,
            y,
            kind,
            owner: None,
        }
    }
}

/// A rectangular tile grid. Tiles are stored x-major (x outer, y inner), the
/// creation order of the original generator; the derived gold and heal index
/// lists keep that order, and the heal list order is the respawn tie-break.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BoardRepr", into = "BoardRepr")]
pub struct Board {
    pub id: Uuid,
    pub width: i32,
    pub height: i32,
    tiles: Vec<Tile>,
    gold: Vec<usize>,
    heal: Vec<usize>,
}

impl Board {
    /// Procedurally lay out a board. Deterministic in (width, height, tier);
    /// no owner is ever set here.
    pub fn generate(width: i32, height: i32, tier: u8) -> Self {
        assert!(width > 0 && height > 0, "board dimensions must be positive");

        let mut tiles = Vec::with_capacity((width * height) as usize);
        for x in 0..width {
            for y in 0..height {
                tiles.push(Tile::new(x, y, layout_kind(tier, x, y, width, height)));
            }
        }

        let mut board = Self {
            id: Uuid::new_v4(),
            width,
            height,
            tiles: Vec::new(),
            gold: Vec::new(),
            heal: Vec::new(),
        };
        board.set_tiles(tiles);
        board
    }

    /// Replace the tile collection wholesale and recompute the derived gold
    /// and heal indexes.
    pub fn set_tiles(&mut self, tiles: Vec<Tile>) {
        debug_assert_eq!(tiles.len(), (self.width * self.height) as usize);
        self.tiles = tiles;
        self.gold.clear();
        self.heal.clear();
        for (idx, tile) in self.tiles.iter().enumerate() {
            match tile.kind {
                TileKind::Gold => self.gold.push(idx),
                TileKind::Heal => self.heal.push(idx),
                _ => {}
            }
        }
    }

    fn index(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.contains(x, y), "tile ({x},{y}) out of bounds");
        (x * self.height + y) as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    pub fn tile_at(&self, x: i32, y: i32) -> &Tile {
        &self.tiles[self.index(x, y)]
    }

    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> &mut Tile {
        let idx = self.index(x, y);
        &mut self.tiles[idx]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn gold_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.gold.iter().map(|idx| &self.tiles[*idx])
    }

    pub fn heal_tiles(&self) -> impl Iterator<Item = &Tile> {
        self.heal.iter().map(|idx| &self.tiles[*idx])
    }

    pub fn set_owner(&mut self, x: i32, y: i32, owner: Option<Uuid>) {
        let idx = self.index(x, y);
        self.tiles[idx].owner = owner;
    }

    /// Release every gold tile held by the given player.
    pub fn release_gold(&mut self, player_id: Uuid) {
        for idx in &self.gold {
            let tile = &mut self.tiles[*idx];
            if tile.owner == Some(player_id) {
                tile.owner = None;
            }
        }
    }

    /// Clear all gold ownership (match start / replay reset).
    pub fn clear_owners(&mut self) {
        for idx in &self.gold {
            self.tiles[*idx].owner = None;
        }
    }

    /// The heal tile closest to (x, y) by Manhattan distance. Ties go to the
    /// first tile in heal-list order.
    pub fn nearest_heal(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let mut closest: Option<(i32, i32, i32)> = None;
        for tile in self.heal_tiles() {
            let dist = (tile.x - x).abs() + (tile.y - y).abs();
            match closest {
                Some((_, _, best)) if best <= dist => {}
                _ => closest = Some((tile.x, tile.y, dist)),
            }
        }
        closest.map(|(hx, hy, _)| (hx, hy))
    }
}

/// Tile type for one cell of the tier's fixed pattern. Evaluation order
/// matters: earlier arms win where patterns overlap (heal before wall on
/// tier 2).
fn layout_kind(tier: u8, x: i32, y: i32, width: i32, height: i32) -> TileKind {
    let cx = width / 2;
    let cy = height / 2;

    match tier {
        0 => {
            // Gold directly opposite the first starting slot
            if x == width - 1 && y == cy {
                TileKind::Gold
            } else {
                TileKind::Ground
            }
        }
        1 => {
            if x == width - 1 && y == cy {
                TileKind::Gold
            // Wall column across the center, endpoints open
            } else if x == cx && y > 0 && y < height - 1 {
                TileKind::Wall
            } else {
                TileKind::Ground
            }
        }
        3 => {
            // Gold flanking the center
            if (x == cx + 1 || x == cx - 1) && y == cy {
                TileKind::Gold
            // Heal in the corners
            } else if (x == 0 || x == width - 1) && (y == 0 || y == height - 1) {
                TileKind::Heal
            // Broken border one cell in, with a gap at each mid-edge
            } else if ((x == 1 || x == width - 2) && y > 0 && y < height - 1 && y != cy)
                || ((y == 1 || y == height - 2) && x > 0 && x < width - 1 && x != cx)
            {
                TileKind::Wall
            } else {
                TileKind::Ground
            }
        }
        // Tier 2, and the fallback for every higher tier
        _ => {
            // Heal flanking the center
            if (x == cx + 1 || x == cx - 1) && y == cy {
                TileKind::Heal
            // Gold in the corners
            } else if (x == 0 || x == width - 1) && (y == 0 || y == height - 1) {
                TileKind::Gold
            // Wall cross through the center, border excluded
            } else if (x == cx && y > 0 && y < height - 1)
                || (y == cy && x > 0 && x < width - 1)
            {
                TileKind::Wall
            } else {
                TileKind::Ground
            }
        }
    }
}

/// Canonical wire form: `{width, height, tiles}`. The board id is a
/// persistence concern and stays out of the serialized state.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardRepr {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl From<Board> for BoardRepr {
    fn from(board: Board) -> Self {
        Self {
            width: board.width,
            height: board.height,
            tiles: board.tiles,
        }
    }
}

impl From<BoardRepr> for Board {
    fn from(repr: BoardRepr) -> Self {
        let mut board = Self {
            id: Uuid::new_v4(),
            width: repr.width,
            height: repr.height,
            tiles: Vec::new(),
            gold: Vec::new(),
            heal: Vec::new(),
        };
        board.set_tiles(repr.tiles);
        board
    }
}
