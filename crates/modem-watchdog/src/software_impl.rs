//! Software relay implementation.
//!
//! This module provides `SoftwareRelay`, an in-memory implementation of the
//! `PowerActuator` trait for dry runs and hardware-free environments.

use async_trait::async_trait;
use portable_atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

use crate::error::{ActuatorError, ActuatorResult};
use crate::ports::PowerActuator;

/// Call counts recorded by a [`SoftwareRelay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayCalls {
    /// Number of `cut_power` calls.
    pub cut: u64,
    /// Number of `restore_power` calls.
    pub restore: u64,
    /// Number of `close` calls.
    pub close: u64,
}

/// Relay that only tracks what a physical relay would be doing.
///
/// Every call is counted, including calls that fail because a failure was
/// injected with [`SoftwareRelay::set_failing`]. A failing call leaves the
/// simulated power state unchanged.
///
/// # Example
///
/// ```rust
/// use modem_watchdog::{PowerActuator, SoftwareRelay};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), modem_watchdog::ActuatorError> {
/// let relay = SoftwareRelay::new();
/// relay.cut_power().await?;
/// assert!(relay.is_power_cut());
/// relay.restore_power().await?;
/// assert!(!relay.is_power_cut());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SoftwareRelay {
    power_cut: AtomicBool,
    failing: AtomicBool,
    cut_calls: AtomicU64,
    restore_calls: AtomicU64,
    close_calls: AtomicU64,
}

impl SoftwareRelay {
    /// Create a relay with power restored.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// Whether the simulated modem is currently unpowered.
    #[must_use]
    pub fn is_power_cut(&self) -> bool {
        self.power_cut.load(Ordering::Acquire)
    }

    /// Snapshot of the call counters.
    #[must_use]
    pub fn calls(&self) -> RelayCalls {
        RelayCalls {
            cut: self.cut_calls.load(Ordering::Relaxed),
            restore: self.restore_calls.load(Ordering::Relaxed),
            close: self.close_calls.load(Ordering::Relaxed),
        }
    }

    fn switch(&self, counter: &AtomicU64, cut: bool) -> ActuatorResult<()> {
        counter.fetch_add(1, Ordering::Relaxed);
        if self.failing.load(Ordering::Acquire) {
            return Err(ActuatorError::unavailable("injected relay failure"));
        }
        self.power_cut.store(cut, Ordering::Release);
        debug!(power_cut = cut, "software relay switched");
        Ok(())
    }
}

#[async_trait]
impl PowerActuator for SoftwareRelay {
    async fn cut_power(&self) -> ActuatorResult<()> {
        self.switch(&self.cut_calls, true)
    }

    async fn restore_power(&self) -> ActuatorResult<()> {
        self.switch(&self.restore_calls, false)
    }

    async fn close(&self) -> ActuatorResult<()> {
        self.switch(&self.close_calls, false)
    }
}
