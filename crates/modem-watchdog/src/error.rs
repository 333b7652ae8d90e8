//! Error types for the modem watchdog.

use core::time::Duration;

use thiserror::Error;

/// Errors raised while building a [`TimingPolicy`](crate::policy::TimingPolicy).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// A timing value is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl PolicyError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// Errors reported by a [`PowerActuator`](crate::ports::PowerActuator).
///
/// The controller never propagates these; it logs them and keeps to its
/// timer schedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    /// The helper process could not be started.
    #[error("Failed to spawn {program}: {reason}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// The helper process ran but reported failure.
    #[error("{command} failed: {detail}")]
    CommandFailed {
        /// Command line that was executed.
        command: String,
        /// Exit status and captured output.
        detail: String,
    },

    /// The helper process did not finish in time and was killed.
    #[error("{command} timed out after {after:?}")]
    Timeout {
        /// Command line that was executed.
        command: String,
        /// Time allowed before giving up.
        after: Duration,
    },

    /// The relay is unavailable (closed, or failure injected in tests).
    #[error("Relay unavailable: {0}")]
    Unavailable(String),
}

impl ActuatorError {
    /// Create a spawn error.
    #[must_use]
    pub fn spawn(program: impl Into<String>, reason: impl core::fmt::Display) -> Self {
        Self::Spawn {
            program: program.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a command failure error.
    #[must_use]
    pub fn command_failed(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(command: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            command: command.into(),
            after,
        }
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}

/// A specialized `Result` type for policy construction.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// A specialized `Result` type for actuator operations.
pub type ActuatorResult<T> = Result<T, ActuatorError>;
