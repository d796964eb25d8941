pub mod board_display;

pub use board_display::{render_board, render_scores};
