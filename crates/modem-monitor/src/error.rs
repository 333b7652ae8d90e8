//! Error types for the monitor service

use modem_watchdog::PolicyError;
use thiserror::Error;

/// Errors in the effective monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no ping targets configured")]
    NoTargets,

    #[error("invalid metrics address {addr:?}: {reason}")]
    InvalidMetricsAddr { addr: String, reason: String },

    #[error("ping timeout must be greater than zero")]
    ZeroPingTimeout,

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ConfigError::NoTargets.to_string(), "no ping targets configured");

        let err = ConfigError::from(PolicyError::invalid_configuration("ping interval is zero"));
        assert_eq!(err.to_string(), "Invalid configuration: ping interval is zero");
    }
}
