//! Collaborator traits consumed by the controller.
//!
//! The controller owns none of the transport, relay, or metrics machinery.
//! Each concern is injected at construction behind one of these traits so
//! that tests can substitute scripted fakes.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ActuatorResult;
use crate::state::State;

/// Outcome of one probe round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PingOutcome {
    /// At least one target answered.
    Success,
    /// No target answered, or the probe mechanism itself failed.
    Failure,
}

impl From<bool> for PingOutcome {
    fn from(reachable: bool) -> Self {
        if reachable {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Reachability check across the configured targets.
///
/// # Implementation Requirements
///
/// 1. Every call MUST finish within the implementation's own timeout.
/// 2. Cancelling `shutdown` MUST make the call return promptly.
/// 3. Probe-mechanism errors are reported as `false`, never raised.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Run one probe round; `true` if any target is reachable.
    async fn probe(&self, shutdown: &CancellationToken) -> bool;
}

/// Relay that switches the modem's power.
///
/// All operations are idempotent. `restore_power` is the safe state.
#[async_trait]
pub trait PowerActuator: Send + Sync {
    /// Cut power to the modem.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay could not be switched.
    async fn cut_power(&self) -> ActuatorResult<()>;

    /// Restore power to the modem.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay could not be switched.
    async fn restore_power(&self) -> ActuatorResult<()>;

    /// Release the relay, leaving power restored. Called once at process end.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay could not be left in the safe state.
    async fn close(&self) -> ActuatorResult<()>;
}

/// One-way sink for controller events.
///
/// Calls are fire-and-forget: implementations MUST NOT block and have no
/// way to fail the controller.
pub trait ObservabilitySink: Send + Sync {
    /// Publish the current state. Called on every transition attempt,
    /// including self-transitions.
    fn state_changed(&self, state: State);

    /// Count an actual state change.
    fn transition_recorded(&self, from: State, to: State);

    /// Count an entry into `Resetting`.
    fn reset_recorded(&self);

    /// Count the outcome of one probe round.
    fn ping_recorded(&self, outcome: PingOutcome);
}
