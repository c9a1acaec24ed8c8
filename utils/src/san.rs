//! Standard Algebraic Notation (SAN) output.
//!
//! cozy-chess encodes castling as "king captures own rook" (e.g. e1h1), which
//! is also how castling is recognized here.

use cozy_chess::{Board, GameStatus, Move, Piece, Square};

use crate::board::in_check;

/// Formats a legal move in SAN, e.g. "e4", "Nbd2", "exd5", "O-O-O", "e8=Q#".
pub fn move_to_san(board: &Board, mv: Move) -> String {
    let mut san = String::new();
    let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);

    if is_castling(board, mv, piece) {
        if (mv.to.file() as usize) > (mv.from.file() as usize) {
            san.push_str("O-O");
        } else {
            san.push_str("O-O-O");
        }
    } else {
        let capture = is_capture(board, mv, piece);

        if piece == Piece::Pawn {
            // Pawn captures include the file
            if capture {
                san.push(file_char(mv.from));
            }
        } else {
            san.push(piece_char(piece));

            let (needs_file, needs_rank) = disambiguation(board, mv, piece);
            if needs_file {
                san.push(file_char(mv.from));
            }
            if needs_rank {
                san.push(rank_char(mv.from));
            }
        }

        if capture {
            san.push('x');
        }
        san.push_str(&mv.to.to_string());

        if let Some(promotion) = mv.promotion {
            san.push('=');
            san.push(piece_char(promotion));
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);

    if after.status() == GameStatus::Won {
        san.push('#');
    } else if in_check(&after) {
        san.push('+');
    }

    san
}

fn is_castling(board: &Board, mv: Move, piece: Piece) -> bool {
    piece == Piece::King && board.colors(board.side_to_move()).has(mv.to)
}

fn is_capture(board: &Board, mv: Move, piece: Piece) -> bool {
    let en_passant = piece == Piece::Pawn && mv.from.file() != mv.to.file();
    en_passant || board.colors(!board.side_to_move()).has(mv.to)
}

/// Returns (needs_file, needs_rank) for a non-pawn move.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> (bool, bool) {
    let mut rivals: Vec<Square> = Vec::new();

    board.generate_moves(|moves| {
        if moves.piece == piece && moves.from != mv.from && moves.to.has(mv.to) {
            rivals.push(moves.from);
        }
        false
    });

    if rivals.is_empty() {
        return (false, false);
    }

    let same_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let same_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

    match (same_file, same_rank) {
        (false, _) => (true, false),    // File disambiguates
        (true, false) => (false, true), // Rank disambiguates
        (true, true) => (true, true),   // Need both
    }
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(square: Square) -> char {
    (b'a' + square.file() as u8) as char
}

fn rank_char(square: Square) -> char {
    (b'1' + square.rank() as u8) as char
}
