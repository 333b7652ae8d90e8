//! The watchdog controller state machine.
//!
//! A single loop runs one state handler at a time. Each handler waits on its
//! timers, runs probe rounds, and returns exactly once with either the next
//! state or a shutdown notice. Handlers are the only place the controller
//! suspends.

use core::fmt;
use core::time::Duration;
use std::sync::Arc;

use tokio::time::{Interval, MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::PolicyResult;
use crate::policy::TimingPolicy;
use crate::ports::{ConnectivityProbe, ObservabilitySink, PingOutcome, PowerActuator};
use crate::state::State;

/// What a state handler decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Next(State),
    Shutdown,
}

/// Connectivity watchdog that power-cycles the modem when it goes dark.
///
/// The controller is driven purely by probe results and elapsed time. Its
/// only outputs are actuator calls and sink events; the current state is not
/// readable from outside; observers use the sink instead.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use modem_watchdog::prelude::*;
/// use tokio_util::sync::CancellationToken;
///
/// struct AlwaysUp;
///
/// #[async_trait::async_trait]
/// impl ConnectivityProbe for AlwaysUp {
///     async fn probe(&self, _shutdown: &CancellationToken) -> bool {
///         true
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), PolicyError> {
/// let sink = Arc::new(AtomicSink::new());
/// let mut controller = WatchdogController::new(
///     Arc::new(AlwaysUp),
///     Arc::new(SoftwareRelay::new()),
///     sink.clone(),
///     TimingPolicy::default(),
/// )?;
///
/// let shutdown = CancellationToken::new();
/// shutdown.cancel();
/// controller.run(shutdown).await;
/// assert_eq!(sink.state(), State::Operating);
/// # Ok(())
/// # }
/// ```
pub struct WatchdogController {
    probe: Arc<dyn ConnectivityProbe>,
    actuator: Arc<dyn PowerActuator>,
    sink: Arc<dyn ObservabilitySink>,
    policy: TimingPolicy,
    state: State,
}

impl fmt::Debug for WatchdogController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchdogController")
            .field("policy", &self.policy)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl WatchdogController {
    /// Create a controller in the `Operating` state.
    ///
    /// # Errors
    ///
    /// Returns an error if `policy` fails validation.
    pub fn new(
        probe: Arc<dyn ConnectivityProbe>,
        actuator: Arc<dyn PowerActuator>,
        sink: Arc<dyn ObservabilitySink>,
        policy: TimingPolicy,
    ) -> PolicyResult<Self> {
        policy.validate()?;
        Ok(Self {
            probe,
            actuator,
            sink,
            policy,
            state: State::Operating,
        })
    }

    /// Run the control loop until `shutdown` is cancelled.
    ///
    /// Starts from `Operating`. If shutdown arrives while power is being cut
    /// or is cut, power is restored before this returns.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        self.transition(State::Operating);

        while !shutdown.is_cancelled() {
            let step = match self.state {
                State::Operating => self.run_operating(&shutdown).await,
                State::Investigating => self.run_investigating(&shutdown).await,
                State::Resetting => self.run_resetting(&shutdown).await,
                State::Recovering => self.run_recovering(&shutdown).await,
            };

            match step {
                Step::Next(next) => self.transition(next),
                Step::Shutdown => break,
            }
        }

        info!(state = %self.state, "watchdog controller stopped");
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            info!(from = %self.state, to = %next, "state transition");
            self.sink.transition_recorded(self.state, next);
        }
        self.state = next;
        self.sink.state_changed(next);
    }

    /// Run one probe round. `None` means shutdown pre-empted it.
    async fn ping_round(&self, shutdown: &CancellationToken) -> Option<PingOutcome> {
        let reachable = tokio::select! {
            biased;
            () = shutdown.cancelled() => return None,
            reachable = self.probe.probe(shutdown) => reachable,
        };

        let outcome = PingOutcome::from(reachable);
        self.sink.ping_recorded(outcome);
        debug!(state = %self.state, ?outcome, "probe round finished");
        Some(outcome)
    }

    async fn run_operating(&self, shutdown: &CancellationToken) -> Step {
        let mut ticker = periodic(self.policy.ping_interval);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => return Step::Shutdown,
                _ = ticker.tick() => match self.ping_round(shutdown).await {
                    Some(PingOutcome::Success) => {}
                    Some(PingOutcome::Failure) => return Step::Next(State::Investigating),
                    None => return Step::Shutdown,
                },
            }
        }
    }

    async fn run_investigating(&self, shutdown: &CancellationToken) -> Step {
        let mut ticker = periodic(self.policy.investigate_interval);
        let deadline = sleep(self.policy.investigate_duration);
        tokio::pin!(deadline);

        // The deadline is polled before the ticker so a zero-length window
        // resolves without probing.
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => return Step::Shutdown,
                () = &mut deadline => {
                    warn!(
                        window = ?self.policy.investigate_duration,
                        "no connectivity for the whole investigation window"
                    );
                    return Step::Next(State::Resetting);
                }
                _ = ticker.tick() => match self.ping_round(shutdown).await {
                    Some(PingOutcome::Success) => return Step::Next(State::Operating),
                    Some(PingOutcome::Failure) => {}
                    None => return Step::Shutdown,
                },
            }
        }
    }

    async fn run_resetting(&self, shutdown: &CancellationToken) -> Step {
        self.sink.reset_recorded();
        warn!(hold = ?self.policy.reset_duration, "cutting modem power");

        // A wedged relay must not outlive shutdown; abandon the cut and
        // switch the pin back.
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                info!("shutdown requested while cutting power");
                self.restore_power().await;
                return Step::Shutdown;
            }
            result = self.actuator.cut_power() => {
                if let Err(e) = result {
                    error!(error = %e, "failed to cut modem power");
                }
            }
        }

        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                info!("shutdown requested while power is cut");
                self.restore_power().await;
                return Step::Shutdown;
            }
            () = sleep(self.policy.reset_duration) => {}
        }

        self.restore_power().await;
        Step::Next(State::Recovering)
    }

    async fn run_recovering(&self, shutdown: &CancellationToken) -> Step {
        let mut ticker = periodic(self.policy.ping_interval);
        let deadline = sleep(self.policy.recover_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => return Step::Shutdown,
                () = &mut deadline => {
                    warn!(
                        timeout = ?self.policy.recover_timeout,
                        "recovery timeout, resetting again"
                    );
                    return Step::Next(State::Resetting);
                }
                _ = ticker.tick() => match self.ping_round(shutdown).await {
                    Some(PingOutcome::Success) => return Step::Next(State::Operating),
                    Some(PingOutcome::Failure) => {}
                    None => return Step::Shutdown,
                },
            }
        }
    }

    async fn restore_power(&self) {
        info!("restoring modem power");
        if let Err(e) = self.actuator.restore_power().await {
            error!(error = %e, "failed to restore modem power");
        }
    }
}

/// A ticker whose first tick lands one full period after creation.
fn periodic(period: Duration) -> Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.reset();
    ticker
}
