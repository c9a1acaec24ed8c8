use arrayvec::ArrayVec;
use log::debug;
use uci::commands::Info;
use uci::is_null_move;
use utils::{split_uci_move, Color, MoveError};

use crate::error::EngineError;
use crate::evaluation::{depth_fraction, format_nps, format_wdl, normalize_wdl, Evaluation};
use crate::rules::Rules;
use crate::scheduler::AnalysisRequest;
use crate::view::{EvalBar, Indicator, View};

/// Moves of the principal variation shown.
pub const PV_PREVIEW: usize = 4;

const BLACK_TO_MOVE: &str = "… ";

/// Turns engine output and lifecycle changes into view updates.
pub struct Presenter {
    view: Box<dyn View>,
}

impl Presenter {
    pub fn new(view: Box<dyn View>) -> Self {
        Self { view }
    }

    pub fn loading(&mut self, label: &str) {
        self.view
            .indicator(Indicator::Initializing, &format!("Loading {} engine...", label));
    }

    pub fn ready(&mut self, label: &str) {
        self.view
            .indicator(Indicator::Ready, &format!("{} engine active", label));
        self.view.line_visible(true);
    }

    pub fn failed(&mut self, message: &str) {
        self.view.indicator(Indicator::Error, message);
    }

    pub fn analyzing(&mut self, side_to_move: Color) {
        let side = match side_to_move {
            Color::White => "White",
            Color::Black => "Black",
        };
        self.view
            .indicator(Indicator::Initializing, &format!("Analyzing: {}", side));
        self.view.line_visible(true);
    }

    pub fn engine_name(&mut self, name: &str) {
        self.view.engine_name(name);
    }

    pub fn disabled(&mut self) {
        self.view.indicator(Indicator::Idle, "Engine off");
        self.show_evaluation(&Evaluation::neutral());
        self.view.depth("-", 0.0);
        self.view.speed("-");
        self.view.line_visible(false);
    }

    /// `side_to_move` is the side that has no moves left when mated.
    pub fn game_over(&mut self, checkmate: bool, side_to_move: Color) {
        let (evaluation, result) = if checkmate {
            match !side_to_move {
                Color::White => (Evaluation::checkmate(Color::White), "1-0"),
                Color::Black => (Evaluation::checkmate(Color::Black), "0-1"),
            }
        } else {
            (Evaluation::draw(), "½-½")
        };

        self.view.indicator(Indicator::Error, "Game Over");
        self.view.evaluation(&evaluation.text);
        self.view.eval_bar(&bar(&evaluation, result));
        self.view.depth("-", 0.0);
        self.view.speed("-");
        self.view.line_visible(false);
    }

    /// Renders an `info` line of the current request. Lines without a score
    /// only update depth and speed.
    pub fn info(&mut self, info: &Info, request: &AnalysisRequest, rules: &dyn Rules) {
        if let Some(depth) = info.depth {
            self.view.depth(&depth.to_string(), depth_fraction(depth));
        }
        if let Some(nps) = info.nodes_per_second {
            self.view.speed(&format_nps(nps));
        }

        let Some(score) = info.score else {
            return;
        };
        self.show_evaluation(&Evaluation::from_engine(score, request.side_to_move));

        if let Some(wdl) = info.wdl {
            self.view
                .wdl(&format_wdl(normalize_wdl(wdl, request.side_to_move)));
        }

        let line = principal_line(rules, &request.fen, &info.pv);
        if !line.is_empty() {
            self.view.line(&format!(
                "Line: {}{}",
                move_prefix(request.side_to_move),
                line.join(" ")
            ));
        }
    }

    pub fn best_move(&mut self, token: &str, request: &AnalysisRequest, rules: &dyn Rules) {
        if is_null_move(token) {
            return;
        }
        let Some((from, to, promotion)) = split_uci_move(token) else {
            debug!("Unreadable best move {:?}", token);
            return;
        };

        let san = match rules.apply_move(&request.fen, from, to, promotion) {
            Ok((san, _)) => san,
            Err(e) => {
                debug!("{}", EngineError::from(e));
                token.to_string()
            }
        };

        self.view.line(&format!(
            "Best Move: {}{}",
            move_prefix(request.side_to_move),
            san
        ));
        self.view.highlight(from, to);
    }

    fn show_evaluation(&mut self, evaluation: &Evaluation) {
        self.view.evaluation(&evaluation.text);
        self.view.eval_bar(&bar(evaluation, &evaluation.text));
    }
}

fn bar(evaluation: &Evaluation, label: &str) -> EvalBar {
    let (white_label, black_label) = if evaluation.favours_white() {
        (label.to_string(), String::new())
    } else {
        (String::new(), label.to_string())
    };

    EvalBar {
        fill: evaluation.fill,
        white_label,
        black_label,
    }
}

fn move_prefix(side_to_move: Color) -> &'static str {
    match side_to_move {
        Color::White => "",
        Color::Black => BLACK_TO_MOVE,
    }
}

/// SAN of the first moves of `pv`, played from `fen`. Stops at the first
/// move that does not apply.
pub fn principal_line(
    rules: &dyn Rules,
    fen: &str,
    pv: &[String],
) -> ArrayVec<String, PV_PREVIEW> {
    let mut line = ArrayVec::new();
    let mut position = fen.to_string();

    for token in pv.iter().take(PV_PREVIEW) {
        match play_scratch(rules, &position, token) {
            Ok((san, next)) => {
                line.push(san);
                position = next;
            }
            Err(e) => {
                debug!("{}", e);
                break;
            }
        }
    }

    line
}

fn play_scratch(rules: &dyn Rules, fen: &str, token: &str) -> Result<(String, String), EngineError> {
    let (from, to, promotion) = split_uci_move(token).ok_or_else(|| MoveError::Malformed {
        notation: token.to_string(),
    })?;

    Ok(rules.apply_move(fen, from, to, promotion)?)
}
