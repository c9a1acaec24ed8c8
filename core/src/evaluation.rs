//! Engine scores in White's perspective, as text and as an eval bar fill.

use uci::commands::{Score, Wdl};
use utils::Color;

/// Bar score used for a forced mate.
pub const MATE_BAR_SCORE: f64 = 10.0;

/// Depth at which the depth bar is full.
pub const FULL_DEPTH: u32 = 25;

const MIN_FILL: f64 = 0.03;
const MAX_FILL: f64 = 0.97;

/// Engine scores are relative to the side to move; this flips them to White's view.
pub fn normalize(score: Score, side_to_move: Color) -> Score {
    match side_to_move {
        Color::White => score,
        Color::Black => score.negate(),
    }
}

pub fn normalize_wdl(wdl: Wdl, side_to_move: Color) -> Wdl {
    match side_to_move {
        Color::White => wdl,
        Color::Black => wdl.flipped(),
    }
}

/// Fraction of the bar given to White for a score in pawns.
pub fn fill_fraction(score: f64) -> f64 {
    (0.5 + 0.5 * (score / 4.0).tanh()).clamp(MIN_FILL, MAX_FILL)
}

pub fn depth_fraction(depth: u32) -> f64 {
    (depth as f64 / FULL_DEPTH as f64).min(1.0)
}

pub fn format_nps(nps: u64) -> String {
    if nps > 100_000 {
        format!("{:.2} Lakh", nps as f64 / 100_000.0)
    } else {
        format!("{:.1}k", nps as f64 / 1000.0)
    }
}

pub fn format_wdl(wdl: Wdl) -> String {
    let percent = |permille: u32| permille as f64 / 10.0;
    format!(
        "W {:.1}% D {:.1}% L {:.1}%",
        percent(wdl.win),
        percent(wdl.draw),
        percent(wdl.loss)
    )
}

/// A score ready for display, always from White's side.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Pawns, or +-10 for a mate
    pub score: f64,
    pub text: String,
    pub fill: f64,
}

impl Evaluation {
    pub fn from_engine(score: Score, side_to_move: Color) -> Self {
        match normalize(score, side_to_move) {
            Score::Centipawns(cp) => {
                let pawns = cp as f64 / 100.0;
                let text = if cp >= 0 {
                    format!("+{:.2}", pawns)
                } else {
                    format!("{:.2}", pawns)
                };
                Self::new(pawns, text)
            }
            // Side to move is mated
            Score::Mate(0) => {
                let score = match side_to_move {
                    Color::White => -MATE_BAR_SCORE,
                    Color::Black => MATE_BAR_SCORE,
                };
                Self::new(score, "MATE".to_string())
            }
            Score::Mate(n) if n > 0 => Self::new(MATE_BAR_SCORE, format!("+M{}", n)),
            Score::Mate(n) => Self::new(-MATE_BAR_SCORE, format!("-M{}", n.unsigned_abs())),
        }
    }

    pub fn checkmate(winner: Color) -> Self {
        let score = match winner {
            Color::White => MATE_BAR_SCORE,
            Color::Black => -MATE_BAR_SCORE,
        };
        Self::new(score, "CHECKMATE".to_string())
    }

    pub fn draw() -> Self {
        Self::new(0.0, "DRAW".to_string())
    }

    /// Shown while the engine is off.
    pub fn neutral() -> Self {
        Self::new(0.0, "0.00".to_string())
    }

    fn new(score: f64, text: String) -> Self {
        Self {
            score,
            text,
            fill: fill_fraction(score),
        }
    }

    pub fn favours_white(&self) -> bool {
        self.score >= 0.0
    }
}
