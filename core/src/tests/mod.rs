
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

use uci::TransportMessage;
use utils::Game;

use crate::backend::BackendVariant;
use crate::config::{Settings, DEBOUNCE_DELAY, HANDSHAKE_TIMEOUT};
use crate::controller::{Controller, Event, UiCommand};
use crate::lifecycle::SessionState;
use crate::view::Indicator;
use mocks::{Display, MockLauncher, RecordingView};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const FOOLS_MATE: &str = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";

/// Drives a controller by hand: events are pumped synchronously and time
/// only moves when a test advances it.
struct Harness {
    controller: Controller,
    launcher: MockLauncher,
    display: Rc<RefCell<Display>>,
    rx: Receiver<Event>,
    now: Instant,
}

impl Harness {
    fn new(backend: BackendVariant, fen: &str) -> Self {
        let (events, rx) = channel();
        let launcher = MockLauncher::new();
        let (view, display) = RecordingView::new();

        let mut settings = Settings {
            backend,
            ..Settings::default()
        };
        settings.options.threads.value = 2;

        let controller = Controller::new(
            settings,
            Box::new(launcher.clone()),
            Box::new(Game::from_fen(fen).unwrap()),
            Box::new(view),
            events,
        );

        Self {
            controller,
            launcher,
            display,
            rx,
            now: Instant::now(),
        }
    }

    /// Enabled, handshake done, first analysis running, sent log cleared.
    fn analysing(backend: BackendVariant, fen: &str) -> Self {
        let mut harness = Self::new(backend, fen);
        harness.command(UiCommand::Enable);
        if backend == BackendVariant::Local {
            harness.emit(TransportMessage::Ready);
        }
        harness.engine("uciok");
        harness.engine("readyok");
        harness.advance(DEBOUNCE_DELAY);
        harness.launcher.clear_sent();
        harness
    }

    fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            assert!(self.controller.handle(event, self.now));
        }
    }

    fn command(&mut self, command: UiCommand) {
        assert!(self.controller.handle(Event::Ui(command), self.now));
        self.pump();
    }

    fn emit(&mut self, message: TransportMessage) {
        self.launcher.emit(message);
        self.pump();
    }

    fn engine(&mut self, line: &str) {
        self.emit(TransportMessage::Line(line.to_string()));
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
        self.controller.fire_timers(self.now);
        self.pump();
    }

    fn sent(&self) -> Vec<String> {
        self.launcher.sent()
    }

    fn count_sent(&self, prefix: &str) -> usize {
        self.sent().iter().filter(|line| line.starts_with(prefix)).count()
    }

    fn indicator(&self) -> Option<(Indicator, String)> {
        self.display.borrow().indicator.clone()
    }
}

#[test]
fn test_start_position_analysis() {
    let mut h = Harness::new(BackendVariant::Remote, START);
    h.command(UiCommand::Enable);
    assert_eq!(h.sent(), vec!["uci"]);
    assert_eq!(h.indicator().unwrap().0, Indicator::Initializing);

    h.engine("id name Stockfish 16");
    h.engine("uciok");
    h.engine("readyok");
    assert_eq!(h.controller.session_state(), SessionState::Ready);
    assert_eq!(h.indicator().unwrap().0, Indicator::Ready);

    h.advance(DEBOUNCE_DELAY);
    assert_eq!(
        h.sent(),
        vec![
            "uci".to_string(),
            "setoption name Hash value 32".to_string(),
            "isready".to_string(),
            "stop".to_string(),
            format!("position fen {}", START),
            "go infinite".to_string(),
        ]
    );
    assert_eq!(
        h.indicator(),
        Some((Indicator::Initializing, "Analyzing: White".to_string()))
    );

    h.engine("info depth 10 seldepth 14 nps 2350000 score cp 25 pv e2e4 e7e5");

    let display = h.display.borrow();
    assert_eq!(display.engine_name.as_deref(), Some("Stockfish 16"));
    assert_eq!(display.evaluation.as_deref(), Some("+0.25"));
    assert_eq!(display.line.as_deref(), Some("Line: e4 e5"));
    assert_eq!(display.depth, Some(("10".to_string(), 0.4)));
    assert_eq!(display.speed.as_deref(), Some("23.50 Lakh"));

    let bar = display.bar.as_ref().unwrap();
    assert!((bar.fill - 0.53).abs() < 0.005);
    assert_eq!(bar.white_label, "+0.25");
    assert!(bar.black_label.is_empty());
}

#[test]
fn test_black_to_move_is_normalized() {
    let mut h = Harness::analysing(BackendVariant::Remote, AFTER_E4);
    assert_eq!(
        h.indicator(),
        Some((Indicator::Initializing, "Analyzing: Black".to_string()))
    );

    h.engine("info depth 12 score cp 25 wdl 400 500 100 pv e7e5 g1f3");
    {
        let display = h.display.borrow();
        assert_eq!(display.evaluation.as_deref(), Some("-0.25"));
        assert_eq!(display.line.as_deref(), Some("Line: … e5 Nf3"));
        assert_eq!(display.wdl.as_deref(), Some("W 10.0% D 50.0% L 40.0%"));
        assert_eq!(display.bar.as_ref().unwrap().black_label, "-0.25");
    }

    h.engine("info depth 20 score mate 3 pv d8h4");
    assert_eq!(h.display.borrow().evaluation.as_deref(), Some("-M3"));
}

#[test]
fn test_info_without_score_updates_depth_and_speed_only() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.engine("info depth 7 nps 45600");
    let display = h.display.borrow();
    assert_eq!(display.depth.as_ref().map(|(text, _)| text.as_str()), Some("7"));
    assert_eq!(display.speed.as_deref(), Some("45.6k"));
    assert_eq!(display.evaluation, None);
    assert_eq!(display.line, None);
}

#[test]
fn test_best_move() {
    let mut h = Harness::analysing(BackendVariant::Remote, AFTER_E4);

    h.engine("bestmove g8f6 ponder e4e5");
    let display = h.display.borrow();
    assert_eq!(display.line.as_deref(), Some("Best Move: … Nf6"));
    assert_eq!(display.highlights, vec![("g8".to_string(), "f6".to_string())]);
}

#[test]
fn test_best_move_none_is_ignored() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);
    h.engine("info depth 3 score cp 10 pv d2d4");

    h.engine("bestmove (none)");
    let display = h.display.borrow();
    assert_eq!(display.line.as_deref(), Some("Line: d4"));
    assert!(display.highlights.is_empty());
}

#[test]
fn test_pv_stops_at_illegal_move() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.engine("info depth 9 score cp 30 pv e2e4 e7e5 e4e5 g1f3");
    assert_eq!(h.display.borrow().line.as_deref(), Some("Line: e4 e5"));
}

#[test]
fn test_debounce_collapses_bursts() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.command(UiCommand::PlayMove("e2e4".to_string()));
    h.advance(Duration::from_millis(10));
    h.command(UiCommand::PlayMove("e7e5".to_string()));
    h.advance(Duration::from_millis(10));
    h.command(UiCommand::PlayMove("g1f3".to_string()));
    assert!(h.sent().is_empty());

    h.advance(DEBOUNCE_DELAY);
    assert_eq!(h.count_sent("go infinite"), 1);
    assert_eq!(h.count_sent("position fen"), 1);
    let position = h.sent().into_iter().find(|line| line.starts_with("position")).unwrap();
    assert!(position.contains("/5N2/"), "{}", position);
    assert!(position.contains(" b "), "{}", position);
}

#[test]
fn test_stale_output_is_discarded() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);
    let first = h.controller.generation();

    h.command(UiCommand::PlayMove("e2e4".to_string()));
    h.advance(DEBOUNCE_DELAY);
    assert!(h.controller.generation() > first);

    // Still from the search of the previous position
    h.engine("info depth 22 score cp 300 pv d2d4 d7d5");
    h.engine("bestmove d2d4 ponder d7d5");
    {
        let display = h.display.borrow();
        assert_eq!(display.evaluation, None);
        assert_eq!(display.line, None);
        assert!(display.highlights.is_empty());
    }

    h.engine("info depth 8 score cp -20 pv e7e5");
    let display = h.display.borrow();
    assert_eq!(display.evaluation.as_deref(), Some("+0.20"));
    assert_eq!(display.line.as_deref(), Some("Line: … e5"));
}

#[test]
fn test_handshake_timeout_then_late_uciok() {
    let mut h = Harness::new(BackendVariant::Remote, START);
    h.command(UiCommand::Enable);

    h.advance(HANDSHAKE_TIMEOUT);
    assert_eq!(h.sent(), vec!["uci", "isready"]);

    h.engine("readyok");
    assert_eq!(h.controller.session_state(), SessionState::Ready);

    h.engine("uciok");
    h.engine("uciok");
    h.engine("readyok");
    assert_eq!(h.count_sent("setoption"), 1);
    assert_eq!(
        h.sent(),
        vec!["uci", "isready", "setoption name Hash value 32", "isready"]
    );
}

#[test]
fn test_uciok_cancels_handshake_timeout() {
    let mut h = Harness::new(BackendVariant::Remote, START);
    h.command(UiCommand::Enable);
    h.engine("uciok");

    h.advance(HANDSHAKE_TIMEOUT);
    assert_eq!(h.count_sent("isready"), 1);
}

#[test]
fn test_local_backend_options() {
    let mut h = Harness::new(BackendVariant::Local, START);
    h.command(UiCommand::Enable);
    assert!(h.sent().is_empty());

    h.emit(TransportMessage::Diagnostic("Initialized".to_string()));
    h.emit(TransportMessage::Ready);
    h.engine("uciok");
    assert_eq!(
        h.sent(),
        vec![
            "uci",
            "setoption name Hash value 32",
            "setoption name Threads value 2",
            "setoption name UCI_ShowWDL value true",
            "isready",
        ]
    );
}

#[test]
fn test_late_readyok_after_disable_is_inert() {
    let mut h = Harness::new(BackendVariant::Remote, START);
    h.command(UiCommand::Enable);
    h.engine("uciok");

    h.command(UiCommand::Disable);
    assert_eq!(
        h.indicator(),
        Some((Indicator::Idle, "Engine off".to_string()))
    );
    assert_eq!(h.display.borrow().evaluation.as_deref(), Some("0.00"));
    h.launcher.clear_sent();

    h.engine("readyok");
    h.advance(Duration::from_secs(1));
    assert!(h.sent().is_empty());
    assert_eq!(h.controller.session_state(), SessionState::Disabled);
    assert_eq!(h.indicator().unwrap().0, Indicator::Idle);
}

#[test]
fn test_disable_cancels_pending_analysis() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);
    let generation = h.controller.generation();

    h.command(UiCommand::PlayMove("e2e4".to_string()));
    h.command(UiCommand::Disable);
    assert!(h.controller.generation() > generation);
    assert_eq!(h.sent(), vec!["stop", "quit"]);

    h.engine("info depth 30 score cp 99 pv e7e5");
    h.advance(DEBOUNCE_DELAY);
    assert_eq!(h.sent(), vec!["stop", "quit"]);
    assert_eq!(h.display.borrow().evaluation.as_deref(), Some("0.00"));
}

#[test]
fn test_launch_failure() {
    let mut h = Harness::new(BackendVariant::Remote, START);
    h.launcher.fail_next("connection refused");

    h.command(UiCommand::Enable);
    let (indicator, text) = h.indicator().unwrap();
    assert_eq!(indicator, Indicator::Error);
    assert!(text.contains("connection refused"), "{}", text);
    assert_eq!(h.controller.session_state(), SessionState::Failed);

    // No automatic retry, but enabling again relaunches
    h.command(UiCommand::Enable);
    assert_eq!(h.launcher.launches(), 1);
    assert_eq!(h.sent(), vec!["uci"]);
}

#[test]
fn test_worker_fault_during_bring_up() {
    let mut h = Harness::new(BackendVariant::Local, START);
    h.command(UiCommand::Enable);

    h.emit(TransportMessage::Fault(
        "Failed to launch stockfish: not found".to_string(),
    ));
    assert_eq!(h.controller.session_state(), SessionState::Failed);
    assert_eq!(h.indicator().unwrap().0, Indicator::Error);

    h.emit(TransportMessage::Ready);
    assert!(h.sent().is_empty());
}

#[test]
fn test_engine_exit_fails_session() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.emit(TransportMessage::Closed);
    assert_eq!(h.controller.session_state(), SessionState::Failed);
    assert_eq!(h.indicator().unwrap().0, Indicator::Error);

    h.command(UiCommand::PlayMove("e2e4".to_string()));
    h.advance(DEBOUNCE_DELAY);
    assert!(h.sent().is_empty());
}

#[test]
fn test_terminal_position_is_not_searched() {
    let mut h = Harness::new(BackendVariant::Remote, FOOLS_MATE);
    h.command(UiCommand::Enable);
    h.engine("uciok");
    h.engine("readyok");
    h.launcher.clear_sent();

    h.advance(DEBOUNCE_DELAY);
    assert_eq!(h.sent(), vec!["stop"]);

    let display = h.display.borrow();
    assert_eq!(display.indicator, Some((Indicator::Error, "Game Over".to_string())));
    assert_eq!(display.evaluation.as_deref(), Some("CHECKMATE"));
    assert!(!display.line_visible);

    let bar = display.bar.as_ref().unwrap();
    assert_eq!(bar.black_label, "0-1");
    assert_eq!(bar.fill, 0.03);
}

#[test]
fn test_line_returns_after_game_over() {
    let mut h = Harness::new(BackendVariant::Remote, FOOLS_MATE);
    h.command(UiCommand::Enable);
    h.engine("uciok");
    h.engine("readyok");
    h.advance(DEBOUNCE_DELAY);
    assert!(!h.display.borrow().line_visible);

    h.command(UiCommand::SetPosition(START.to_string()));
    h.advance(DEBOUNCE_DELAY);
    h.engine("info depth 10 score cp 25 pv e2e4 e7e5");
    {
        let display = h.display.borrow();
        assert!(display.line_visible);
        assert_eq!(display.line.as_deref(), Some("Line: e4 e5"));
    }

    h.engine("bestmove e2e4");
    h.command(UiCommand::Enable);
    let display = h.display.borrow();
    assert!(display.line_visible);
    assert_eq!(display.line.as_deref(), Some("Best Move: e4"));
}

#[test]
fn test_fault_after_ready_is_contained() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.emit(TransportMessage::Fault("Failed to write to engine: broken pipe".to_string()));
    assert_eq!(h.controller.session_state(), SessionState::Ready);
    assert_ne!(h.indicator().unwrap().0, Indicator::Error);

    h.command(UiCommand::PlayMove("e2e4".to_string()));
    h.advance(DEBOUNCE_DELAY);
    assert_eq!(h.count_sent("go infinite"), 1);
}

#[test]
fn test_extreme_mate_score_is_displayed() {
    let mut h = Harness::analysing(BackendVariant::Remote, AFTER_E4);

    h.engine("info depth 1 score mate -2147483648");
    assert_eq!(h.display.borrow().evaluation.as_deref(), Some("+M2147483647"));
}

#[test]
fn test_auto_play_suppresses_analysis() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.command(UiCommand::AutoPlay(true));
    h.command(UiCommand::PlayMove("e2e4".to_string()));
    h.command(UiCommand::PlayMove("e7e5".to_string()));
    h.advance(DEBOUNCE_DELAY);
    assert!(h.sent().is_empty());

    h.command(UiCommand::AutoPlay(false));
    h.advance(DEBOUNCE_DELAY);
    assert_eq!(h.count_sent("go infinite"), 1);
}

#[test]
fn test_backend_switch_relaunches() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    h.command(UiCommand::SelectBackend(BackendVariant::Remote));
    assert_eq!(h.launcher.launches(), 1);

    h.command(UiCommand::SelectBackend(BackendVariant::Local));
    assert_eq!(h.launcher.launches(), 2);
    assert_eq!(h.launcher.last_variant(), Some(BackendVariant::Local));
    assert_eq!(h.sent(), vec!["stop", "quit"]);
    assert_eq!(h.controller.session_state(), SessionState::Uninitialized);

    h.emit(TransportMessage::Ready);
    assert_eq!(h.sent(), vec!["stop", "quit", "uci"]);
}

#[test]
fn test_backend_selection_while_disabled_waits() {
    let mut h = Harness::new(BackendVariant::Local, START);

    h.command(UiCommand::SelectBackend(BackendVariant::Remote));
    assert_eq!(h.launcher.launches(), 0);

    h.command(UiCommand::Enable);
    assert_eq!(h.launcher.last_variant(), Some(BackendVariant::Remote));
    assert_eq!(h.sent(), vec!["uci"]);
}

#[test]
fn test_quit_stops_the_engine() {
    let mut h = Harness::analysing(BackendVariant::Remote, START);

    assert!(!h.controller.handle(Event::Quit, h.now));
    h.controller.shutdown();
    assert_eq!(h.sent(), vec!["stop", "quit"]);
}
