//! Monitor daemon: wires the probe, relay, and metrics into the controller
//! and runs it until a shutdown signal arrives.

use std::sync::Arc;

use anyhow::{Context, Result};
use modem_watchdog::{PowerActuator, SoftwareRelay, WatchdogController};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::MonitorConfig;
use crate::observability::{MetricsServer, PrometheusSink};
use crate::probe::PingProbe;
use crate::relay::PinctrlRelay;

/// Process-level owner of one watchdog controller.
#[derive(Debug)]
pub struct MonitorDaemon {
    config: MonitorConfig,
}

impl MonitorDaemon {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<()> {
        let signals = ShutdownSignals::install().context("Failed to install signal handlers")?;
        let shutdown = CancellationToken::new();

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            let name = signals.recv().await;
            info!(signal = name, "shutdown signal received");
            trigger.cancel();
        });

        self.run_until(shutdown).await
    }

    /// Run until `shutdown` is cancelled.
    ///
    /// Relay initialization and metrics binding failures are returned before
    /// the controller starts.
    pub async fn run_until(self, shutdown: CancellationToken) -> Result<()> {
        let config = self.config;

        let probe = Arc::new(
            PingProbe::new(config.targets.clone(), config.ping_timeout)
                .with_program(config.ping_program.clone()),
        );

        let actuator: Arc<dyn PowerActuator> = if config.dry_run {
            info!("dry run: relay is simulated");
            Arc::new(SoftwareRelay::new())
        } else {
            let relay = PinctrlRelay::open(
                config.gpio_pin,
                config.pinctrl_program.clone(),
                PinctrlRelay::DEFAULT_TIMEOUT,
            )
            .await
            .with_context(|| format!("Failed to initialize relay on GPIO {}", config.gpio_pin))?;
            debug!(pin = relay.pin(), "relay opened");
            Arc::new(relay)
        };

        let sink = Arc::new(PrometheusSink::new().context("Failed to create metrics registry")?);

        let server_shutdown = CancellationToken::new();
        let server = MetricsServer::bind(config.metrics_addr, sink.clone(), server_shutdown.clone())
            .await?;

        info!(
            targets = ?probe.targets(),
            metrics_addr = %server.local_addr(),
            "modem monitor started"
        );

        let mut controller = WatchdogController::new(probe, actuator.clone(), sink, config.policy)
            .context("Invalid timing policy")?;

        controller.run(shutdown).await;

        if let Err(e) = actuator.close().await {
            error!(error = %e, "failed to release relay");
        }

        server_shutdown.cancel();
        server.wait().await;

        info!("modem monitor stopped");
        Ok(())
    }
}

#[cfg(unix)]
struct ShutdownSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }

    async fn recv(mut self) -> &'static str {
        tokio::select! {
            _ = self.sigterm.recv() => "SIGTERM",
            _ = self.sigint.recv() => "SIGINT",
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals;

#[cfg(not(unix))]
impl ShutdownSignals {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(self) -> &'static str {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "error waiting for Ctrl+C");
        }
        "Ctrl+C"
    }
}
