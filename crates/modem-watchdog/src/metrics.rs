//! In-process observability sinks.
//!
//! [`AtomicSink`] keeps the controller's counters in lock-free atomics and is
//! what external readers should consult for the current state. `AtomicU64`
//! comes from `portable-atomic` so the same code runs on 32-bit ARM boards.

use portable_atomic::{AtomicU32, AtomicU64, Ordering};

use crate::ports::{ObservabilitySink, PingOutcome};
use crate::state::State;

/// Point-in-time copy of the counters held by an [`AtomicSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Last state published by the controller.
    pub state: State,
    /// Number of actual state changes.
    pub transitions: u64,
    /// Number of entries into `Resetting`.
    pub resets: u64,
    /// Number of successful probe rounds.
    pub ping_success: u64,
    /// Number of failed probe rounds.
    pub ping_failure: u64,
}

impl MetricsSnapshot {
    /// Total number of probe rounds.
    #[must_use]
    pub fn ping_rounds(&self) -> u64 {
        self.ping_success.saturating_add(self.ping_failure)
    }
}

/// Lock-free sink holding the latest state and event counters.
#[derive(Debug, Default)]
pub struct AtomicSink {
    state: AtomicU32,
    transitions: AtomicU64,
    resets: AtomicU64,
    ping_success: AtomicU64,
    ping_failure: AtomicU64,
}

impl AtomicSink {
    /// Create a sink with every counter at zero and state `Operating`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last state published by the controller.
    #[must_use]
    pub fn state(&self) -> State {
        State::from_raw(self.state.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Copy out every counter.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            state: self.state(),
            transitions: self.transitions.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            ping_success: self.ping_success.load(Ordering::Relaxed),
            ping_failure: self.ping_failure.load(Ordering::Relaxed),
        }
    }
}

impl ObservabilitySink for AtomicSink {
    fn state_changed(&self, state: State) {
        self.state.store(state.to_raw(), Ordering::Release);
    }

    fn transition_recorded(&self, _from: State, _to: State) {
        self.transitions.fetch_add(1, Ordering::Relaxed);
    }

    fn reset_recorded(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    fn ping_recorded(&self, outcome: PingOutcome) {
        let counter = match outcome {
            PingOutcome::Success => &self.ping_success,
            PingOutcome::Failure => &self.ping_failure,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
