//! Prelude for modem-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.

pub use crate::controller::WatchdogController;
pub use crate::error::{ActuatorError, ActuatorResult, PolicyError, PolicyResult};
pub use crate::metrics::{AtomicSink, MetricsSnapshot};
pub use crate::policy::{TimingPolicy, TimingPolicyBuilder};
pub use crate::ports::{ConnectivityProbe, ObservabilitySink, PingOutcome, PowerActuator};
pub use crate::software_impl::{RelayCalls, SoftwareRelay};
pub use crate::state::State;
