use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};
use uci::{MessageSink, Transport, UciInput};

use crate::backend::{BackendProfile, BackendVariant, Launcher};
use crate::config::{AppliedOptions, EngineOptions};
use crate::error::EngineError;

/// Identifies one launch of an engine. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Handshaking,
    Ready,
    Failed,
    Disabled,
}

/// One live connection to an engine.
pub struct EngineSession {
    id: SessionId,
    profile: BackendProfile,
    transport: Box<dyn Transport>,
    state: SessionState,
    applied: Option<AppliedOptions>,
}

impl EngineSession {
    fn send(&mut self, command: &UciInput) {
        if let Err(e) = self.transport.send(command) {
            warn!("{}", EngineError::Transport(e.to_string()));
        }
    }

    fn close(&mut self) {
        self.send(&UciInput::Stop);
        self.send(&UciInput::Quit);
        self.transport.shutdown();
    }
}

/// Result of a successful `enable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Launch {
    pub session: SessionId,
    /// `uci` was sent right away and the handshake wait should be armed.
    pub handshake_started: bool,
}

/// Owns the single engine session and walks it through the handshake.
pub struct Lifecycle {
    launcher: Box<dyn Launcher>,
    options: EngineOptions,
    session: Option<EngineSession>,
    // State reported while no session exists
    resting: SessionState,
    next_id: u64,
}

impl Lifecycle {
    pub fn new(launcher: Box<dyn Launcher>, options: EngineOptions) -> Self {
        Self {
            launcher,
            options,
            session: None,
            resting: SessionState::Uninitialized,
            next_id: 1,
        }
    }

    /// Brings up a session for `variant` unless a healthy one already runs.
    ///
    /// Returns `Ok(None)` when nothing had to be launched. A live session for
    /// another variant, or a failed one, is torn down first.
    pub fn enable<F>(
        &mut self,
        variant: BackendVariant,
        make_sink: F,
    ) -> Result<Option<Launch>, EngineError>
    where
        F: FnOnce(SessionId) -> MessageSink,
    {
        if let Some(session) = &self.session {
            if session.profile.variant == variant && session.state != SessionState::Failed {
                return Ok(None);
            }
        }
        self.disable();

        let id = SessionId(self.next_id);
        self.next_id += 1;

        let profile = variant.profile();
        let transport = match self.launcher.launch(variant, make_sink(id)) {
            Ok(transport) => transport,
            Err(e) => {
                self.resting = SessionState::Failed;
                return Err(e);
            }
        };
        info!("Launched {} engine session {}", profile.label, id);

        let mut session = EngineSession {
            id,
            profile,
            transport,
            state: SessionState::Uninitialized,
            applied: None,
        };

        let handshake_started = !profile.announces_ready;
        if handshake_started {
            session.state = SessionState::Handshaking;
            session.send(&UciInput::Uci);
        }
        self.session = Some(session);

        Ok(Some(Launch {
            session: id,
            handshake_started,
        }))
    }

    /// The worker finished loading; returns true when the handshake started.
    pub fn on_worker_ready(&mut self, id: SessionId) -> bool {
        let Some(session) = self.live_mut(id) else {
            return false;
        };
        if session.state != SessionState::Uninitialized {
            return false;
        }

        session.state = SessionState::Handshaking;
        session.send(&UciInput::Uci);
        true
    }

    /// Applies options once, then probes readiness. A `uciok` that arrives
    /// after the handshake timeout still gets its options and another probe.
    pub fn on_uciok(&mut self, id: SessionId) -> bool {
        let Some(session) = self.session.as_mut().filter(|session| session.id == id) else {
            return false;
        };
        if session.applied.is_some() {
            debug!("Ignoring repeated uciok from session {}", id);
            return false;
        }

        for command in self.options.commands_for(&session.profile) {
            session.send(&command);
        }
        session.applied = Some(self.options.applied_for(&session.profile));
        session.send(&UciInput::IsReady);
        true
    }

    /// No `uciok` in time: probe readiness without options.
    pub fn on_handshake_timeout(&mut self, id: SessionId, waited: Duration) -> bool {
        let Some(session) = self.live_mut(id) else {
            return false;
        };
        if session.state != SessionState::Handshaking || session.applied.is_some() {
            return false;
        }

        warn!("{}", EngineError::HandshakeTimeout(waited));
        session.send(&UciInput::IsReady);
        true
    }

    /// Returns true when the session just became Ready.
    pub fn on_readyok(&mut self, id: SessionId) -> bool {
        let Some(session) = self.live_mut(id) else {
            return false;
        };
        if session.state != SessionState::Handshaking {
            return false;
        }

        session.state = SessionState::Ready;
        true
    }

    /// Marks the live session Failed. The transport is closed.
    pub fn fail(&mut self, id: SessionId) -> bool {
        let Some(session) = self.live_mut(id) else {
            return false;
        };
        if session.state == SessionState::Failed {
            return false;
        }

        session.state = SessionState::Failed;
        session.transport.shutdown();
        true
    }

    /// Tears the live session down: `stop`, `quit`, close.
    pub fn disable(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };

        if session.state != SessionState::Failed {
            session.close();
        }
        info!("Closed engine session {}", session.id);
        self.resting = SessionState::Disabled;
        true
    }

    /// Sends to the live session, if any. Transport errors are logged.
    pub fn send(&mut self, command: &UciInput) {
        match &mut self.session {
            Some(session) if session.state != SessionState::Failed => session.send(command),
            _ => debug!("No engine session, dropping {:?}", command),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    pub fn is_live(&self, id: SessionId) -> bool {
        self.live(id).is_some()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|session| session.id)
    }

    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(self.resting, |session| session.state)
    }

    #[cfg(test)]
    pub fn applied(&self) -> Option<&AppliedOptions> {
        self.session.as_ref().and_then(|session| session.applied.as_ref())
    }

    fn live(&self, id: SessionId) -> Option<&EngineSession> {
        self.session.as_ref().filter(|session| session.id == id)
    }

    fn live_mut(&mut self, id: SessionId) -> Option<&mut EngineSession> {
        self.session.as_mut().filter(|session| session.id == id)
    }
}

impl Drop for Lifecycle {
    fn drop(&mut self) {
        self.disable();
    }
}
