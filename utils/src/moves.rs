use std::fmt;
use std::str::FromStr;

use cozy_chess::{util::parse_uci_move, Board, Move, Piece, Square};

use crate::san::move_to_san;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The position string is not valid FEN
    InvalidPosition { fen: String },
    /// The move text is not of the form <from><to>[promotion]
    Malformed { notation: String },
    /// Well-formed, but not legal in the position
    Illegal { notation: String },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::InvalidPosition { fen } => write!(f, "Invalid position '{fen}'"),
            MoveError::Malformed { notation } => write!(f, "Malformed move '{notation}'"),
            MoveError::Illegal { notation } => write!(f, "Illegal move '{notation}'"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Splits a UCI move token into origin, destination and optional promotion piece.
pub fn split_uci_move(token: &str) -> Option<(&str, &str, Option<&str>)> {
    if token.len() < 4 || !token.is_ascii() {
        return None;
    }

    let promotion = if token.len() > 4 {
        Some(&token[4..])
    } else {
        None
    };
    Some((&token[0..2], &token[2..4], promotion))
}

/// Resolves a move given as squares (standard castling notation accepted)
/// and checks it is legal on `board`.
pub fn resolve_move(
    board: &Board,
    from: &str,
    to: &str,
    promotion: Option<&str>,
) -> Result<Move, MoveError> {
    let notation = format!("{}{}{}", from, to, promotion.unwrap_or(""));
    let malformed = || MoveError::Malformed {
        notation: notation.clone(),
    };

    Square::from_str(from).map_err(|_| malformed())?;
    Square::from_str(to).map_err(|_| malformed())?;
    if let Some(promotion) = promotion {
        parse_promotion(promotion).ok_or_else(malformed)?;
    }

    let mv = parse_uci_move(board, &notation).map_err(|_| malformed())?;
    if !board.is_legal(mv) {
        return Err(MoveError::Illegal { notation });
    }

    Ok(mv)
}

/// Plays a move on a scratch copy of `fen`, returning its SAN and the resulting FEN.
pub fn apply_move(
    fen: &str,
    from: &str,
    to: &str,
    promotion: Option<&str>,
) -> Result<(String, String), MoveError> {
    let mut board = Board::from_fen(fen, false).map_err(|_| MoveError::InvalidPosition {
        fen: fen.to_string(),
    })?;

    let mv = resolve_move(&board, from, to, promotion)?;
    let san = move_to_san(&board, mv);
    board.play_unchecked(mv);

    Ok((san, board.to_string()))
}

fn parse_promotion(text: &str) -> Option<Piece> {
    match text {
        "q" | "Q" => Some(Piece::Queen),
        "r" | "R" => Some(Piece::Rook),
        "b" | "B" => Some(Piece::Bishop),
        "n" | "N" => Some(Piece::Knight),
        _ => None,
    }
}
