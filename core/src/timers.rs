use std::time::Instant;

use ahash::AHashMap;

use crate::lifecycle::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Quiet period before an analysis request fires
    Debounce,
    /// Wait for `uciok` from a session
    Handshake(SessionId),
}

/// Pending deadlines, polled by the event loop.
#[derive(Debug, Default)]
pub struct Timers {
    deadlines: AHashMap<Timer, Instant>,
}

impl Timers {
    /// Arms `timer`, replacing any earlier deadline.
    pub fn arm(&mut self, timer: Timer, deadline: Instant) {
        self.deadlines.insert(timer, deadline);
    }

    pub fn cancel(&mut self, timer: Timer) {
        self.deadlines.remove(&timer);
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Timer> {
        let mut due: Vec<(Timer, Instant)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(timer, deadline)| (*timer, *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);

        for (timer, _) in &due {
            self.deadlines.remove(timer);
        }
        due.into_iter().map(|(timer, _)| timer).collect()
    }
}
