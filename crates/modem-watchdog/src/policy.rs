//! Timing policy for the watchdog controller.

use core::time::Duration;

use crate::error::{PolicyError, PolicyResult};

/// The five intervals that drive the controller.
///
/// Set once at construction and never mutated. Only `ping_interval` and
/// `investigate_interval` must be non-zero, because they drive periodic
/// timers; the one-shot durations may be zero and still resolve
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingPolicy {
    /// Probe cadence while `Operating` or `Recovering`.
    pub ping_interval: Duration,
    /// Probe cadence while `Investigating`.
    pub investigate_interval: Duration,
    /// Longest time spent `Investigating` before the outage is confirmed.
    pub investigate_duration: Duration,
    /// How long power is held cut while `Resetting`.
    pub reset_duration: Duration,
    /// Longest wait in `Recovering` before another reset is forced.
    pub recover_timeout: Duration,
}

impl TimingPolicy {
    /// Create a policy builder seeded with the defaults.
    #[must_use]
    pub fn builder() -> TimingPolicyBuilder {
        TimingPolicyBuilder::default()
    }

    /// Validate the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if either periodic interval is zero.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.ping_interval.is_zero() {
            return Err(PolicyError::invalid_configuration(
                "ping_interval must be greater than zero",
            ));
        }
        if self.investigate_interval.is_zero() {
            return Err(PolicyError::invalid_configuration(
                "investigate_interval must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Whether investigation can run more than one probe before its deadline.
    #[must_use]
    pub fn allows_repeated_investigation(&self) -> bool {
        self.investigate_interval < self.investigate_duration
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(10),
            investigate_interval: Duration::from_secs(1),
            investigate_duration: Duration::from_secs(10),
            reset_duration: Duration::from_secs(10),
            recover_timeout: Duration::from_secs(600),
        }
    }
}

/// Builder for [`TimingPolicy`].
#[derive(Debug, Default)]
pub struct TimingPolicyBuilder {
    policy: TimingPolicy,
}

impl TimingPolicyBuilder {
    /// Set the normal probe cadence.
    #[must_use]
    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.policy.ping_interval = interval;
        self
    }

    /// Set the probe cadence while investigating.
    #[must_use]
    pub fn investigate_interval(mut self, interval: Duration) -> Self {
        self.policy.investigate_interval = interval;
        self
    }

    /// Set the confirmation window length.
    #[must_use]
    pub fn investigate_duration(mut self, duration: Duration) -> Self {
        self.policy.investigate_duration = duration;
        self
    }

    /// Set how long power stays cut.
    #[must_use]
    pub fn reset_duration(mut self, duration: Duration) -> Self {
        self.policy.reset_duration = duration;
        self
    }

    /// Set the recovery deadline.
    #[must_use]
    pub fn recover_timeout(mut self, timeout: Duration) -> Self {
        self.policy.recover_timeout = timeout;
        self
    }

    /// Build the policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy is invalid.
    pub fn build(self) -> PolicyResult<TimingPolicy> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
