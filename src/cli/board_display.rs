use std::fmt::Write as _;

use itertools::Itertools;

use crate::game::Game;
use crate::types::TileKind;

/// Render the board as an ASCII grid.
///
/// `#` wall, `+` heal, `$` unclaimed gold, `*` claimed gold, `.` ground;
/// digits mark player positions in join order.
pub fn render_board(game: &Game) -> String {
    let mut out = String::new();
    for y in 0..game.board.height {
        for x in 0..game.board.width {
            let marker = game
                .players
                .iter()
                .position(|p| p.is_at(x, y))
                .map(|idx| char::from_digit(idx as u32 + 1, 10).unwrap_or('?'));

            let cell = if let Some(digit) = marker {
                digit
            } else {
                let tile = game.board.tile_at(x, y);
                match tile.kind {
                    TileKind::Wall => '#',
                    TileKind::Heal => '+',
                    TileKind::Gold if tile.owner.is_some() => '*',
                    TileKind::Gold => '$',
                    TileKind::Ground => '.',
                }
            };
            out.push(cell);
            out.push(' ');
        }
        out.push('\n');
    }
    out
}

/// Score table, highest points first.
pub fn render_scores(game: &Game) -> String {
    let mut out = String::new();
    let ranked = game
        .players
        .iter()
        .sorted_by_key(|p| std::cmp::Reverse(p.points));
    for (rank, player) in ranked.enumerate() {
        let join_order = game
            .players
            .iter()
            .position(|p| p.id == player.id)
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "{}. player {} - {} points, {} health, at ({}, {})",
            rank + 1,
            join_order + 1,
            player.points,
            player.health,
            player.x,
            player.y,
        );
    }
    out
}
