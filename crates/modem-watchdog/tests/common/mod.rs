//! Shared fakes and harness for controller tests.
//!
//! All timing tests run on tokio's paused clock, so the millisecond values
//! below are exact.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use modem_watchdog::prelude::*;
use parking_lot::Mutex;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Policy used by most tests: ping 10ms, investigate every 5ms for 30ms,
/// hold power cut for 20ms, give recovery 100ms.
pub fn fast_policy() -> TimingPolicy {
    TimingPolicy {
        ping_interval: Duration::from_millis(10),
        investigate_interval: Duration::from_millis(5),
        investigate_duration: Duration::from_millis(30),
        reset_duration: Duration::from_millis(20),
        recover_timeout: Duration::from_millis(100),
    }
}

/// Probe that replays a fixed list of answers and then repeats the last one.
#[derive(Debug)]
pub struct ScriptedProbe {
    script: Vec<bool>,
    calls: Mutex<usize>,
}

impl ScriptedProbe {
    pub fn new(script: impl Into<Vec<bool>>) -> Arc<Self> {
        Arc::new(Self {
            script: script.into(),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl ConnectivityProbe for ScriptedProbe {
    async fn probe(&self, _shutdown: &CancellationToken) -> bool {
        let mut calls = self.calls.lock();
        let answer = self
            .script
            .get(*calls)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or(false);
        *calls = calls.saturating_add(1);
        answer
    }
}

/// Probe backed by a closure.
pub struct FnProbe<F>(pub F);

#[async_trait]
impl<F> ConnectivityProbe for FnProbe<F>
where
    F: Fn() -> bool + Send + Sync,
{
    async fn probe(&self, _shutdown: &CancellationToken) -> bool {
        (self.0)()
    }
}

/// One observed state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: State,
    pub to: State,
    pub at: Duration,
}

/// Sink that keeps the counters of an [`AtomicSink`] plus a timestamped
/// transition log.
#[derive(Debug)]
pub struct RecordingSink {
    counters: AtomicSink,
    start: Instant,
    log: Mutex<Vec<Transition>>,
    published: Mutex<Vec<State>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            counters: AtomicSink::new(),
            start: Instant::now(),
            log: Mutex::new(Vec::new()),
            published: Mutex::new(Vec::new()),
        })
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.counters.snapshot()
    }

    pub fn transitions(&self) -> Vec<Transition> {
        self.log.lock().clone()
    }

    pub fn path(&self) -> Vec<(State, State)> {
        self.log.lock().iter().map(|t| (t.from, t.to)).collect()
    }

    pub fn published(&self) -> Vec<State> {
        self.published.lock().clone()
    }
}

impl ObservabilitySink for RecordingSink {
    fn state_changed(&self, state: State) {
        self.counters.state_changed(state);
        self.published.lock().push(state);
    }

    fn transition_recorded(&self, from: State, to: State) {
        self.counters.transition_recorded(from, to);
        self.log.lock().push(Transition {
            from,
            to,
            at: self.start.elapsed(),
        });
    }

    fn reset_recorded(&self) {
        self.counters.reset_recorded();
    }

    fn ping_recorded(&self, outcome: PingOutcome) {
        self.counters.ping_recorded(outcome);
    }
}

/// Run `controller` until `horizon` has elapsed on the (paused) clock.
pub async fn run_for(controller: &mut WatchdogController, horizon: Duration) {
    let shutdown = CancellationToken::new();
    let stopper = shutdown.clone();
    let stop = async move {
        sleep(horizon).await;
        stopper.cancel();
    };
    tokio::join!(controller.run(shutdown), stop);
}

/// Build a controller wired to the given fakes.
pub fn controller(
    probe: Arc<dyn ConnectivityProbe>,
    relay: Arc<SoftwareRelay>,
    sink: Arc<RecordingSink>,
    policy: TimingPolicy,
) -> PolicyResult<WatchdogController> {
    WatchdogController::new(probe, relay, sink, policy)
}
