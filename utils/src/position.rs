use cozy_chess::Color;

/// Side to move as written in the second FEN field.
/// Anything other than an explicit `b` counts as White.
pub fn side_to_move(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}
