use cozy_chess::{BitBoard, Board, Color, GameStatus, Piece, Square};

/// Checks if the position has insufficient material for either side to force checkmate.
/// Returns true for dead drawn positions like:
/// - K vs K
/// - K+N vs K (either side)
/// - K+B vs K (either side)
/// - K+B vs K+B with same-colored bishops
pub fn has_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);

    // If there are any pawns, rooks, or queens, material is sufficient
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);

    let white_minors = (board.colors(Color::White) & (knights | bishops)).len();
    let black_minors = (board.colors(Color::Black) & (knights | bishops)).len();

    // K vs K, K+minor vs K
    if white_minors + black_minors <= 1 {
        return true;
    }

    // K+B vs K+B with bishops on same color squares
    if white_minors == 1 && black_minors == 1 && bishops.len() == 2 {
        let mut colors = bishops.into_iter().map(is_light_square);
        return colors.next() == colors.next();
    }

    false
}

fn is_light_square(square: Square) -> bool {
    (square.file() as usize + square.rank() as usize) % 2 == 1
}

pub fn is_checkmate(board: &Board) -> bool {
    board.status() == GameStatus::Won
}

/// Stalemate, the fifty-move rule or dead material.
pub fn is_dead_draw(board: &Board) -> bool {
    board.status() == GameStatus::Drawn || has_insufficient_material(board)
}

pub fn in_check(board: &Board) -> bool {
    board.checkers() != BitBoard::EMPTY
}
