use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use uci::commands::{GoParams, Info};
use uci::{Decoder, MessageSink, TransportMessage, UciInput, UciOutput};

use crate::backend::{BackendVariant, Launcher};
use crate::config::Settings;
use crate::error::EngineError;
#[cfg(test)]
use crate::lifecycle::SessionState;
use crate::lifecycle::{Lifecycle, SessionId};
use crate::presenter::Presenter;
use crate::rules::Rules;
use crate::scheduler::Scheduler;
use crate::timers::{Timer, Timers};
use crate::view::View;

/// Everything the coordinator reacts to arrives as one of these.
#[derive(Debug)]
pub enum Event {
    Ui(UiCommand),
    Engine {
        session: SessionId,
        message: TransportMessage,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Enable,
    Disable,
    SelectBackend(BackendVariant),
    SetPosition(String),
    PlayMove(String),
    /// Moves are being played automatically; analysis is paused meanwhile.
    AutoPlay(bool),
}

/// Routes transport messages of one session into the event channel.
pub fn forwarder(events: Sender<Event>, session: SessionId) -> MessageSink {
    Arc::new(move |message| {
        let _ = events.send(Event::Engine { session, message });
    })
}

/// Owns all coordination state. Events are handled one at a time.
pub struct Controller {
    settings: Settings,
    lifecycle: Lifecycle,
    scheduler: Scheduler,
    presenter: Presenter,
    timers: Timers,
    decoder: Decoder,
    rules: Box<dyn Rules>,
    events: Sender<Event>,
    backend: BackendVariant,
    enabled: bool,
    auto_play: bool,
}

impl Controller {
    pub fn new(
        settings: Settings,
        launcher: Box<dyn Launcher>,
        rules: Box<dyn Rules>,
        view: Box<dyn View>,
        events: Sender<Event>,
    ) -> Self {
        let lifecycle = Lifecycle::new(launcher, settings.options.clone());
        let backend = settings.backend;

        Self {
            settings,
            lifecycle,
            scheduler: Scheduler::default(),
            presenter: Presenter::new(view),
            timers: Timers::default(),
            decoder: Decoder::new(),
            rules,
            events,
            backend,
            enabled: false,
            auto_play: false,
        }
    }

    /// Main loop: handle events and fire timers until Quit.
    pub fn run(&mut self, events: Receiver<Event>) {
        loop {
            self.fire_timers(Instant::now());

            let received = match self.timers.next_deadline() {
                Some(deadline) => {
                    events.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => events.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            let event = match received {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if !self.handle(event, Instant::now()) {
                break;
            }
        }

        self.shutdown();
    }

    /// Returns false once the loop should stop.
    pub fn handle(&mut self, event: Event, now: Instant) -> bool {
        match event {
            Event::Ui(command) => self.on_command(command, now),
            Event::Engine { session, message } => self.on_transport(session, message, now),
            Event::Quit => return false,
        }
        true
    }

    pub fn fire_timers(&mut self, now: Instant) {
        for timer in self.timers.take_due(now) {
            match timer {
                Timer::Debounce => self.run_analysis(now),
                Timer::Handshake(session) => {
                    self.lifecycle
                        .on_handshake_timeout(session, self.settings.handshake_timeout);
                }
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.timers.cancel(Timer::Debounce);
        self.scheduler.invalidate();
        self.lifecycle.disable();
    }

    #[cfg(test)]
    pub fn session_state(&self) -> SessionState {
        self.lifecycle.state()
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.scheduler.generation()
    }

    fn on_command(&mut self, command: UiCommand, now: Instant) {
        debug!("UI command: {:?}", command);

        match command {
            UiCommand::Enable => {
                self.enabled = true;
                self.start_session(now);
            }
            UiCommand::Disable => {
                self.enabled = false;
                self.stop_session();
                self.presenter.disabled();
            }
            UiCommand::SelectBackend(variant) => {
                if variant == self.backend {
                    return;
                }
                self.backend = variant;
                if self.enabled {
                    self.stop_session();
                    self.start_session(now);
                }
            }
            UiCommand::SetPosition(fen) => match self.rules.set_position(&fen) {
                Ok(()) => self.request_analysis(now),
                Err(e) => warn!("{}", e),
            },
            UiCommand::PlayMove(uci_move) => match self.rules.play(&uci_move) {
                Ok(san) => {
                    info!("Played {}", san);
                    self.request_analysis(now);
                }
                Err(e) => warn!("{}", e),
            },
            UiCommand::AutoPlay(on) => {
                self.auto_play = on;
                if on {
                    self.timers.cancel(Timer::Debounce);
                } else {
                    self.request_analysis(now);
                }
            }
        }
    }

    fn start_session(&mut self, now: Instant) {
        let profile = self.backend.profile();
        let events = self.events.clone();

        match self
            .lifecycle
            .enable(self.backend, |session| forwarder(events, session))
        {
            Ok(Some(launch)) => {
                self.scheduler.reset_in_flight();
                self.presenter.loading(profile.label);
                if launch.handshake_started {
                    self.arm_handshake(launch.session, now);
                }
            }
            Ok(None) => debug!("{} engine already enabled", profile.label),
            Err(e) => {
                error!("{}", e);
                self.presenter.failed(&e.to_string());
            }
        }
    }

    fn stop_session(&mut self) {
        if let Some(session) = self.lifecycle.session_id() {
            self.timers.cancel(Timer::Handshake(session));
        }
        self.timers.cancel(Timer::Debounce);
        self.scheduler.invalidate();
        self.scheduler.reset_in_flight();
        self.lifecycle.disable();
    }

    fn fail_session(&mut self, session: SessionId, e: EngineError) {
        error!("{}", e);
        if !self.lifecycle.fail(session) {
            return;
        }

        self.timers.cancel(Timer::Handshake(session));
        self.timers.cancel(Timer::Debounce);
        self.scheduler.invalidate();
        self.presenter.failed(&e.to_string());
    }

    fn arm_handshake(&mut self, session: SessionId, now: Instant) {
        self.timers
            .arm(Timer::Handshake(session), now + self.settings.handshake_timeout);
    }

    fn on_transport(&mut self, session: SessionId, message: TransportMessage, now: Instant) {
        if !self.lifecycle.is_live(session) {
            debug!("Ignoring {:?} from closed session {}", message, session);
            return;
        }

        match message {
            TransportMessage::Ready => {
                if self.lifecycle.on_worker_ready(session) {
                    self.arm_handshake(session, now);
                }
            }
            TransportMessage::Diagnostic(text) => info!("Engine worker: {}", text),
            TransportMessage::Stderr(text) => warn!("Engine stderr: {}", text),
            TransportMessage::Fault(reason) => {
                if self.lifecycle.is_ready() {
                    warn!("{}", EngineError::Transport(reason));
                } else {
                    self.fail_session(session, EngineError::Launch(reason));
                }
            }
            TransportMessage::Closed => self.fail_session(
                session,
                EngineError::Transport("engine closed the connection".to_string()),
            ),
            TransportMessage::Line(line) => self.on_line(session, &line, now),
        }
    }

    fn on_line(&mut self, session: SessionId, line: &str, now: Instant) {
        let output = self.decoder.decode(line);

        if output.is_search_output() {
            let generation = self.scheduler.attribute(&output);
            if !self.scheduler.is_current(generation) {
                debug!("Discarding stale output: {:?}", line);
                return;
            }
        }

        match output {
            UciOutput::UciOk => {
                self.timers.cancel(Timer::Handshake(session));
                self.lifecycle.on_uciok(session);
            }
            UciOutput::ReadyOk => {
                if self.lifecycle.on_readyok(session) {
                    self.timers.cancel(Timer::Handshake(session));
                    self.presenter.ready(self.backend.profile().label);
                    self.request_analysis(now);
                }
            }
            UciOutput::IdName(name) => self.presenter.engine_name(&name),
            UciOutput::IdAuthor(author) => info!("Engine author: {}", author),
            UciOutput::Option(option) => debug!("Engine option: {}", option),
            UciOutput::InfoString(text) => info!("Engine: {}", text),
            UciOutput::Info(info) => self.present_info(&info),
            UciOutput::BestMove { best_move, ponder } => {
                if let Some(ponder) = ponder {
                    debug!("Engine expects {}", ponder);
                }
                self.present_best_move(&best_move);
            }
            UciOutput::Unknown(line) => {
                if !line.is_empty() {
                    debug!("Unknown engine output: {:?}", line);
                }
            }
        }
    }

    fn present_info(&mut self, info: &Info) {
        debug!(
            "Search: seldepth {:?} multipv {:?} nodes {:?} time {:?} bound {:?}",
            info.sel_depth, info.multi_pv, info.nodes, info.time, info.bound
        );
        if let Some(request) = self.scheduler.current() {
            self.presenter.info(info, request, self.rules.as_ref());
        }
    }

    fn present_best_move(&mut self, best_move: &str) {
        if let Some(request) = self.scheduler.current() {
            debug!(
                "Best move {} after {:?}",
                best_move,
                request.issued_at.elapsed()
            );
            self.presenter.best_move(best_move, request, self.rules.as_ref());
        }
    }

    /// Called whenever the position may have changed. Bursts collapse into
    /// one analysis of the final position.
    pub fn request_analysis(&mut self, now: Instant) {
        if !self.lifecycle.is_ready() || self.auto_play {
            return;
        }
        self.timers.arm(Timer::Debounce, now + self.settings.debounce);
    }

    fn run_analysis(&mut self, now: Instant) {
        if !self.lifecycle.is_ready() || self.auto_play {
            return;
        }

        let request = self.scheduler.issue(self.rules.current_position(), now);
        let generation = request.generation;
        let side_to_move = request.side_to_move;
        let fen = request.fen.clone();

        if self.rules.is_game_over() {
            self.presenter
                .game_over(self.rules.is_checkmate(), side_to_move);
            self.lifecycle.send(&UciInput::Stop);
            return;
        }

        self.presenter.analyzing(side_to_move);
        self.lifecycle.send(&UciInput::Stop);
        self.lifecycle.send(&UciInput::Position { fen });
        self.lifecycle.send(&UciInput::Go(GoParams::infinite()));
        self.scheduler.search_started(generation);
    }
}
