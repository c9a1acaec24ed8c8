mod board;
mod game;
mod moves;
mod position;
mod san;

pub use board::{has_insufficient_material, in_check, is_checkmate, is_dead_draw};
pub use game::Game;
pub use moves::{apply_move, resolve_move, split_uci_move, MoveError};
pub use position::side_to_move;
pub use san::move_to_san;

pub use cozy_chess::Color;
