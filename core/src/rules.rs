use utils::{apply_move, Color, Game, MoveError};

/// Board state and legality, as the coordinator needs them.
pub trait Rules {
    fn current_position(&self) -> String;
    fn is_game_over(&self) -> bool;
    fn is_checkmate(&self) -> bool;
    fn side_to_move(&self) -> Color;

    /// Plays a move on a copy of `fen`; returns its SAN and the resulting FEN.
    fn apply_move(
        &self,
        fen: &str,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<(String, String), MoveError>;

    fn set_position(&mut self, fen: &str) -> Result<(), MoveError>;

    /// Plays a UCI move on the current position and returns its SAN.
    fn play(&mut self, uci_move: &str) -> Result<String, MoveError>;
}

impl Rules for Game {
    fn current_position(&self) -> String {
        self.fen()
    }

    fn is_game_over(&self) -> bool {
        Game::is_game_over(self)
    }

    fn is_checkmate(&self) -> bool {
        Game::is_checkmate(self)
    }

    fn side_to_move(&self) -> Color {
        Game::side_to_move(self)
    }

    fn apply_move(
        &self,
        fen: &str,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<(String, String), MoveError> {
        apply_move(fen, from, to, promotion)
    }

    fn set_position(&mut self, fen: &str) -> Result<(), MoveError> {
        *self = Game::from_fen(fen)?;
        Ok(())
    }

    fn play(&mut self, uci_move: &str) -> Result<String, MoveError> {
        self.play_uci(uci_move)
    }
}
