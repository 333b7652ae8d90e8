//! GPIO relay driven through the `pinctrl` helper.
//!
//! The relay is wired normally-closed: driving the pin high opens it and cuts
//! the modem's power, driving it low closes it again.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use modem_watchdog::{ActuatorError, ActuatorResult, PowerActuator};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    High,
    Low,
}

impl Level {
    fn as_arg(self) -> &'static str {
        match self {
            Self::High => "dh",
            Self::Low => "dl",
        }
    }
}

/// [`PowerActuator`] that shells out to `pinctrl set <pin> dh|dl`.
///
/// Every helper run is bounded; one that overruns is killed and reported as
/// [`ActuatorError::Timeout`].
#[derive(Debug, Clone)]
pub struct PinctrlRelay {
    pin: u32,
    program: String,
    timeout: Duration,
}

impl PinctrlRelay {
    /// Time allowed for one helper run.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Open the relay on `pin` through `program` and make sure the modem is
    /// powered.
    ///
    /// # Errors
    ///
    /// Fails if the helper cannot be run, exits unsuccessfully, or overruns
    /// `timeout`.
    pub async fn open(
        pin: u32,
        program: impl Into<String>,
        timeout: Duration,
    ) -> ActuatorResult<Self> {
        let relay = Self {
            pin,
            program: program.into(),
            timeout,
        };
        relay.drive(Level::Low).await?;
        info!(pin, program = %relay.program, "relay ready, modem powered");
        Ok(relay)
    }

    pub fn pin(&self) -> u32 {
        self.pin
    }

    async fn drive(&self, level: Level) -> ActuatorResult<()> {
        let pin = self.pin.to_string();
        let command_line = format!("{} set {} {}", self.program, pin, level.as_arg());

        let run = Command::new(&self.program)
            .args(["set", &pin, level.as_arg()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        // Dropping the elapsed future kills the helper.
        let output = timeout(self.timeout, run)
            .await
            .map_err(|_elapsed| ActuatorError::timeout(&command_line, self.timeout))?
            .map_err(|e| ActuatorError::spawn(&self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ActuatorError::command_failed(
                command_line,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        debug!(command = %command_line, "relay driven");
        Ok(())
    }
}

#[async_trait]
impl PowerActuator for PinctrlRelay {
    async fn cut_power(&self) -> ActuatorResult<()> {
        self.drive(Level::High).await
    }

    async fn restore_power(&self) -> ActuatorResult<()> {
        self.drive(Level::Low).await
    }

    async fn close(&self) -> ActuatorResult<()> {
        self.drive(Level::Low).await
    }
}
