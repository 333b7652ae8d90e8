//! Observability for the monitor
//!
//! This module provides:
//! - A Prometheus-backed [`ObservabilitySink`] for the watchdog controller
//! - The metrics HTTP endpoint (`/metrics`, `/health`)
//! - Structured logging initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use modem_watchdog::{ObservabilitySink, PingOutcome, State};
use prometheus::{IntCounter, IntGauge, Registry, TextEncoder};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Controller metrics held in a private Prometheus registry.
#[derive(Debug, Clone)]
pub struct PrometheusSink {
    registry: Registry,
    state: IntGauge,
    transitions: IntCounter,
    resets: IntCounter,
    ping_success: IntCounter,
    ping_failure: IntCounter,
}

impl PrometheusSink {
    /// Create the sink and register every metric.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let state = IntGauge::new(
            "modem_monitor_state",
            "Current watchdog state (0=operating, 1=investigating, 2=resetting, 3=recovering)",
        )?;
        let transitions = IntCounter::new(
            "modem_monitor_state_transitions_total",
            "Number of watchdog state changes",
        )?;
        let resets = IntCounter::new(
            "modem_monitor_resets_total",
            "Number of times modem power was cut",
        )?;
        let ping_success = IntCounter::new(
            "modem_monitor_ping_success_total",
            "Probe rounds in which at least one target answered",
        )?;
        let ping_failure = IntCounter::new(
            "modem_monitor_ping_failure_total",
            "Probe rounds in which no target answered",
        )?;

        registry.register(Box::new(state.clone()))?;
        registry.register(Box::new(transitions.clone()))?;
        registry.register(Box::new(resets.clone()))?;
        registry.register(Box::new(ping_success.clone()))?;
        registry.register(Box::new(ping_failure.clone()))?;

        Ok(Self {
            registry,
            state,
            transitions,
            resets,
            ping_success,
            ping_failure,
        })
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode(&self) -> prometheus::Result<String> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

impl ObservabilitySink for PrometheusSink {
    fn state_changed(&self, state: State) {
        self.state.set(i64::from(state.to_raw()));
    }

    fn transition_recorded(&self, _from: State, _to: State) {
        self.transitions.inc();
    }

    fn reset_recorded(&self) {
        self.resets.inc();
    }

    fn ping_recorded(&self, outcome: PingOutcome) {
        match outcome {
            PingOutcome::Success => self.ping_success.inc(),
            PingOutcome::Failure => self.ping_failure.inc(),
        }
    }
}

/// Routes served by the metrics listener.
fn router(sink: Arc<PrometheusSink>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(sink)
}

/// Running metrics HTTP server.
#[derive(Debug)]
pub struct MetricsServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl MetricsServer {
    /// Bind `addr` and start serving until `shutdown` is cancelled.
    ///
    /// Binding failures are returned; errors while serving are only logged.
    pub async fn bind(
        addr: SocketAddr,
        sink: Arc<PrometheusSink>,
        shutdown: CancellationToken,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind metrics server on {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read metrics server address")?;

        info!(addr = %local_addr, "metrics server listening");

        let app = router(sink);
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
            {
                error!(error = %e, "metrics server error");
            }
        });

        Ok(Self { local_addr, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server task to finish after its shutdown token fired.
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            warn!(error = %e, "metrics server task ended abnormally");
        }
    }
}

async fn metrics_handler(AxumState(sink): AxumState<Arc<PrometheusSink>>) -> Response {
    match sink.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            output,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {e}"),
            )
                .into_response()
        }
    }
}

async fn health_handler() -> Response {
    let body = serde_json::json!({
        "status": "healthy",
        "service": "modem-monitor",
    });

    (
        StatusCode::OK,
        [("content-type", "application/json")],
        body.to_string(),
    )
        .into_response()
}

/// Default filter when `RUST_LOG` is unset, by `-v` count.
pub fn default_log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "modem_monitor=info,modem_watchdog=info",
        1 => "modem_monitor=debug,modem_watchdog=debug",
        _ => "modem_monitor=trace,modem_watchdog=trace",
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(verbosity: u8) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbosity)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
