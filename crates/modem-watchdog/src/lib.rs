//! # modem-watchdog
//!
//! Connectivity watchdog for a network modem.
//!
//! The controller periodically checks whether any of a set of remote hosts is
//! reachable. When a confirmed outage is detected it cuts the modem's power
//! through a relay, restores it after a fixed hold time, and waits for
//! connectivity to return, resetting again for as long as it does not.
//!
//! ## State Machine
//!
//! ```text
//! Operating ──fail──► Investigating ──window elapsed──► Resetting
//!     ▲                    │                              │   ▲
//!     │◄──── success ──────┘                  hold elapsed│   │recover timeout
//!     │                                                   ▼   │
//!     └──────────────────── success ─────────────────── Recovering
//! ```
//!
//! ## Architecture
//!
//! - [`controller`] - The state machine and its control loop
//! - [`policy`] - Timing parameters
//! - [`ports`] - Probe, actuator, and sink traits injected into the controller
//! - [`state`] - The state enum
//! - [`metrics`] - Lock-free in-process sink
//! - [`software_impl`] - In-memory relay for dry runs and tests
//! - [`error`] - Error types
//!
//! ## Failure Semantics
//!
//! - Actuator failures are logged and never stop the loop
//! - Probe failures and unreachable hosts are the same thing: a failed round
//! - Shutdown while power is cut always restores power first

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod controller;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod ports;
pub mod prelude;
pub mod software_impl;
pub mod state;

pub use controller::WatchdogController;
pub use error::{ActuatorError, ActuatorResult, PolicyError, PolicyResult};
pub use metrics::{AtomicSink, MetricsSnapshot};
pub use policy::{TimingPolicy, TimingPolicyBuilder};
pub use ports::{ConnectivityProbe, ObservabilitySink, PingOutcome, PowerActuator};
pub use software_impl::{RelayCalls, SoftwareRelay};
pub use state::State;
