use std::collections::VecDeque;
use std::time::Instant;

use uci::UciOutput;
use utils::{side_to_move, Color};

/// One "analyze this position" intent. Superseded, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub fen: String,
    pub side_to_move: Color,
    pub generation: u64,
    pub issued_at: Instant,
}

/// Hands out generation tokens and works out which request an engine line
/// belongs to.
///
/// Every `go` records its generation in a FIFO. The engine answers in
/// command order and ends each search with exactly one `bestmove`, so the
/// front of the FIFO is the search that produced the line being read.
#[derive(Debug, Default)]
pub struct Scheduler {
    generation: u64,
    current: Option<AnalysisRequest>,
    in_flight: VecDeque<u64>,
}

impl Scheduler {
    /// Issues a new current request, invalidating all earlier ones.
    pub fn issue(&mut self, fen: String, now: Instant) -> &AnalysisRequest {
        self.generation += 1;

        let side_to_move = side_to_move(&fen);
        self.current.insert(AnalysisRequest {
            fen,
            side_to_move,
            generation: self.generation,
            issued_at: now,
        })
    }

    /// Invalidates every outstanding request without issuing a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.current = None;
    }

    pub fn search_started(&mut self, generation: u64) {
        self.in_flight.push_back(generation);
    }

    /// The generation an inbound search line belongs to, if any.
    /// A `bestmove` closes the oldest running search.
    pub fn attribute(&mut self, output: &UciOutput) -> Option<u64> {
        match output {
            UciOutput::Info(_) => self.in_flight.front().copied(),
            UciOutput::BestMove { .. } => self.in_flight.pop_front(),
            _ => None,
        }
    }

    pub fn is_current(&self, generation: Option<u64>) -> bool {
        match (generation, &self.current) {
            (Some(generation), Some(current)) => generation == current.generation,
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&AnalysisRequest> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget running searches, e.g. when a new engine session starts.
    pub fn reset_in_flight(&mut self) {
        self.in_flight.clear();
    }
}
