use ahash::AHashMap;
use cozy_chess::{Board, Color};

use crate::board::{is_checkmate, is_dead_draw};
use crate::moves::{resolve_move, split_uci_move, MoveError};
use crate::san::move_to_san;

/// A game in progress: the current board plus how often each position occurred.
pub struct Game {
    board: Board,
    repetitions: AHashMap<u64, u8>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl Game {
    pub fn new(board: Board) -> Self {
        let mut repetitions = AHashMap::new();
        repetitions.insert(board.hash(), 1);

        Self { board, repetitions }
    }

    pub fn from_fen(fen: &str) -> Result<Self, MoveError> {
        let board = Board::from_fen(fen.trim(), false).map_err(|_| MoveError::InvalidPosition {
            fen: fen.to_string(),
        })?;
        Ok(Self::new(board))
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn is_checkmate(&self) -> bool {
        is_checkmate(&self.board)
    }

    pub fn is_threefold_repetition(&self) -> bool {
        self.repetitions
            .get(&self.board.hash())
            .is_some_and(|count| *count >= 3)
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || is_dead_draw(&self.board) || self.is_threefold_repetition()
    }

    /// Plays a move given in UCI notation and returns its SAN.
    pub fn play_uci(&mut self, token: &str) -> Result<String, MoveError> {
        let (from, to, promotion) = split_uci_move(token).ok_or_else(|| MoveError::Malformed {
            notation: token.to_string(),
        })?;

        let mv = resolve_move(&self.board, from, to, promotion)?;
        let san = move_to_san(&self.board, mv);

        self.board.play_unchecked(mv);
        *self.repetitions.entry(self.board.hash()).or_insert(0) += 1;

        Ok(san)
    }
}
