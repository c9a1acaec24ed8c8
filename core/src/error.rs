use std::fmt;
use std::time::Duration;

use utils::MoveError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine process or socket could not be started
    Launch(String),
    /// No `uciok` within the handshake window
    HandshakeTimeout(Duration),
    /// Sending to or receiving from the engine failed
    Transport(String),
    /// A move from the engine could not be applied to the position
    MoveRejected(MoveError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Launch(reason) => write!(f, "Engine failed to launch: {}", reason),
            EngineError::HandshakeTimeout(waited) => {
                write!(f, "No uciok after {}ms, probing readiness", waited.as_millis())
            }
            EngineError::Transport(reason) => write!(f, "Engine transport error: {}", reason),
            EngineError::MoveRejected(e) => write!(f, "Engine move rejected: {}", e),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::MoveRejected(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for EngineError {
    fn from(e: MoveError) -> Self {
        EngineError::MoveRejected(e)
    }
}
