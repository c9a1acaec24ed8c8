use super::commands::{Bound, Info, Score, UciOutput, Wdl};

/// Tokens engines send as `bestmove` when the position has no legal move.
const NO_MOVE_TOKENS: [&str; 2] = ["(none)", "0000"];

pub struct Decoder;

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self
    }

    /// Classifies one engine line by prefix. The first matching prefix wins;
    /// blank and unrecognized lines become `Unknown`.
    pub fn decode(&self, line: &str) -> UciOutput {
        let line = line.trim();

        match line {
            _ if line.starts_with("uciok") => UciOutput::UciOk,

            _ if line.starts_with("id name ") => {
                UciOutput::IdName(line["id name ".len()..].trim().to_string())
            }
            _ if line.starts_with("id author ") => {
                UciOutput::IdAuthor(line["id author ".len()..].trim().to_string())
            }

            _ if line.starts_with("info string") => {
                UciOutput::InfoString(line["info string".len()..].trim().to_string())
            }
            _ if line.starts_with("info ") => UciOutput::Info(self.decode_info(line)),

            _ if line.starts_with("bestmove") => self.decode_bestmove(line),
            _ if line.starts_with("readyok") => UciOutput::ReadyOk,
            _ if line.starts_with("option ") => UciOutput::Option(line.to_string()),

            _ => UciOutput::Unknown(line.to_string()),
        }
    }

    fn decode_info(&self, line: &str) -> Info {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        Info {
            depth: extract_numeric_param(&tokens, "depth"),
            sel_depth: extract_numeric_param(&tokens, "seldepth"),
            multi_pv: extract_numeric_param(&tokens, "multipv"),
            nodes: extract_numeric_param(&tokens, "nodes"),
            nodes_per_second: extract_numeric_param(&tokens, "nps"),
            time: extract_numeric_param(&tokens, "time"),
            score: extract_score(&tokens),
            bound: extract_bound(&tokens),
            wdl: extract_wdl(&tokens),
            pv: extract_pv(&tokens),
        }
    }

    fn decode_bestmove(&self, line: &str) -> UciOutput {
        let mut tokens = line.split_whitespace().skip(1);

        // A bare "bestmove" is treated like "bestmove (none)"
        let best_move = tokens.next().unwrap_or(NO_MOVE_TOKENS[0]).to_string();
        let ponder = match (tokens.next(), tokens.next()) {
            (Some("ponder"), Some(mv)) => Some(mv.to_string()),
            _ => None,
        };

        UciOutput::BestMove { best_move, ponder }
    }
}

/// Returns true for the `bestmove` tokens that mean "no legal move".
pub fn is_null_move(token: &str) -> bool {
    NO_MOVE_TOKENS.contains(&token)
}

fn extract_numeric_param<T: std::str::FromStr>(tokens: &[&str], param: &str) -> Option<T> {
    tokens
        .windows(2)
        .find(|w| w[0] == param)
        .and_then(|w| w[1].parse().ok())
}

fn extract_score(tokens: &[&str]) -> Option<Score> {
    let window = tokens.windows(3).find(|w| w[0] == "score")?;
    let value: i32 = window[2].parse().ok()?;

    match window[1] {
        "cp" => Some(Score::Centipawns(value)),
        "mate" => Some(Score::Mate(value)),
        _ => None,
    }
}

fn extract_bound(tokens: &[&str]) -> Option<Bound> {
    tokens.iter().find_map(|t| match *t {
        "lowerbound" => Some(Bound::Lower),
        "upperbound" => Some(Bound::Upper),
        _ => None,
    })
}

fn extract_wdl(tokens: &[&str]) -> Option<Wdl> {
    let window = tokens.windows(4).find(|w| w[0] == "wdl")?;

    Some(Wdl {
        win: window[1].parse().ok()?,
        draw: window[2].parse().ok()?,
        loss: window[3].parse().ok()?,
    })
}

// The pv is always the last field of an info line
fn extract_pv(tokens: &[&str]) -> Vec<String> {
    tokens
        .iter()
        .position(|t| *t == "pv")
        .map(|start| tokens[start + 1..].iter().map(|t| t.to_string()).collect())
        .unwrap_or_default()
}
