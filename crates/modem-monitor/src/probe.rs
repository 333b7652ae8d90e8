//! Connectivity probe backed by the system `ping` helper.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use modem_watchdog::ConnectivityProbe;
use tokio::process::Command;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Extra time allowed on top of the ping timeout for process start-up.
const SPAWN_GRACE: Duration = Duration::from_millis(500);

/// Pings every target at once; any single reply counts as connectivity.
#[derive(Debug, Clone)]
pub struct PingProbe {
    targets: Vec<String>,
    timeout: Duration,
    program: String,
}

impl PingProbe {
    pub fn new(targets: Vec<String>, timeout: Duration) -> Self {
        Self {
            targets,
            timeout,
            program: "ping".to_string(),
        }
    }

    /// Use a different helper program in place of `ping`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// `-W` only takes whole seconds, so round up and never go below one.
    fn wait_secs(&self) -> u64 {
        let secs = self.timeout.as_secs();
        let rounded = if self.timeout.subsec_nanos() > 0 {
            secs.saturating_add(1)
        } else {
            secs
        };
        rounded.max(1)
    }

    fn command(&self, target: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-c", "1", "-W"])
            .arg(self.wait_secs().to_string())
            .args(["-n", target])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    async fn ping_one(&self, target: &str) -> bool {
        let budget = self.timeout.saturating_add(SPAWN_GRACE);

        match timeout(budget, self.command(target).status()).await {
            Ok(Ok(status)) => {
                debug!(target, success = status.success(), "ping finished");
                status.success()
            }
            Ok(Err(e)) => {
                warn!(target, program = %self.program, error = %e, "failed to run ping");
                false
            }
            Err(elapsed) => {
                debug!(target, %elapsed, "ping timed out");
                false
            }
        }
    }
}

#[async_trait]
impl ConnectivityProbe for PingProbe {
    async fn probe(&self, shutdown: &CancellationToken) -> bool {
        let mut pending: FuturesUnordered<_> =
            self.targets.iter().map(|t| self.ping_one(t)).collect();

        // Dropping `pending` kills any ping still running.
        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => return false,
                next = pending.next() => match next {
                    Some(true) => return true,
                    Some(false) => {}
                    None => return false,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_secs_rounds_up() {
        let probe = |ms| PingProbe::new(Vec::new(), Duration::from_millis(ms));
        assert_eq!(probe(3_000).wait_secs(), 3);
        assert_eq!(probe(2_500).wait_secs(), 3);
        assert_eq!(probe(200).wait_secs(), 1);
    }

    #[tokio::test]
    async fn test_no_targets_is_offline() {
        let probe = PingProbe::new(Vec::new(), Duration::from_secs(1)).with_program("true");
        assert!(!probe.probe(&CancellationToken::new()).await);
    }
}
