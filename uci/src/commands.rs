/// Commands sent from the coordinator to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciInput {
    Uci,
    IsReady,

    SetOption { name: String, value: String },
    Position { fen: String },
    Go(GoParams),

    Stop,
    Quit,
}

/// Lines received from the engine, classified by prefix.
#[derive(Debug, Clone, PartialEq)]
pub enum UciOutput {
    IdName(String),
    IdAuthor(String),
    UciOk,
    ReadyOk,
    BestMove {
        best_move: String,
        ponder: Option<String>,
    },
    Info(Info),
    InfoString(String),
    Option(String),
    Unknown(String),
}

impl UciOutput {
    /// Whether the line belongs to a running search and must be checked for staleness.
    pub fn is_search_output(&self) -> bool {
        matches!(self, UciOutput::Info(_) | UciOutput::BestMove { .. })
    }
}

/// One decoded `info` line. Every field is optional; malformed values are left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub depth: Option<u32>,
    pub sel_depth: Option<u32>,
    pub multi_pv: Option<u32>,
    pub nodes: Option<u64>,
    pub nodes_per_second: Option<u64>,
    pub time: Option<u64>,
    pub score: Option<Score>,
    pub bound: Option<Bound>,
    pub wdl: Option<Wdl>,
    pub pv: Vec<String>,
}

/// Score as reported by the engine, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32), // centipawns
    Mate(i32),       // Positive for mate-in-n, negative for mated-in-n
}

impl Score {
    pub fn negate(self) -> Self {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(cp.saturating_neg()),
            Score::Mate(n) => Score::Mate(n.saturating_neg()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// Win/draw/loss expectation in permille, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wdl {
    pub win: u32,
    pub draw: u32,
    pub loss: u32,
}

impl Wdl {
    pub fn flipped(self) -> Self {
        Wdl {
            win: self.loss,
            draw: self.draw,
            loss: self.win,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    // Search in the background until a stop command is received.
    pub infinite: bool,
}

impl GoParams {
    pub fn infinite() -> Self {
        Self { infinite: true }
    }
}
