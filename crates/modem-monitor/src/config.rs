//! Command-line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! named in its help text. Flags win over the environment. Durations use
//! `humantime` syntax (`10s`, `1m30s`, `500ms`, `1h 5m`).

use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use modem_watchdog::TimingPolicy;
use tracing::{info, warn};

use crate::error::ConfigError;

#[derive(Debug, Clone, Parser)]
#[command(name = "modem-monitor")]
#[command(version)]
#[command(about = "Watch internet connectivity and power-cycle the modem when it drops")]
pub struct Cli {
    /// Hosts to ping, comma separated; any one answering counts as online
    #[arg(long, env = "PING_TARGETS", default_value = "8.8.8.8,1.1.1.1")]
    pub ping_targets: String,

    /// Time between probes while online or recovering
    #[arg(long, env = "PING_INTERVAL", default_value = "10s", value_parser = humantime::parse_duration)]
    pub ping_interval: Duration,

    /// Time between probes while confirming an outage
    #[arg(long, env = "INVESTIGATE_INTERVAL", default_value = "1s", value_parser = humantime::parse_duration)]
    pub investigate_interval: Duration,

    /// How long an outage must last before the modem is reset
    #[arg(long, env = "INVESTIGATE_DURATION", default_value = "10s", value_parser = humantime::parse_duration)]
    pub investigate_duration: Duration,

    /// How long modem power stays cut
    #[arg(long, env = "RESET_DURATION", default_value = "10s", value_parser = humantime::parse_duration)]
    pub reset_duration: Duration,

    /// How long to wait for connectivity after a reset before resetting again
    #[arg(long, env = "RECOVER_TIMEOUT", default_value = "10m", value_parser = humantime::parse_duration)]
    pub recover_timeout: Duration,

    /// Per-target ping timeout
    #[arg(long, env = "PING_TIMEOUT", default_value = "3s", value_parser = humantime::parse_duration)]
    pub ping_timeout: Duration,

    /// GPIO pin driving the relay
    #[arg(long, env = "GPIO_PIN", default_value_t = 4)]
    pub gpio_pin: u32,

    /// Metrics listen address; a bare `:port` listens on all interfaces
    #[arg(long, env = "METRICS_ADDR", default_value = ":9090")]
    pub metrics_addr: String,

    /// Simulate the relay instead of driving the GPIO pin
    #[arg(long, env = "DRY_RUN", value_parser = clap::builder::BoolishValueParser::new())]
    pub dry_run: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Ping helper program
    #[arg(long, env = "PING_PROGRAM", default_value = "ping", hide = true)]
    pub ping_program: String,

    /// GPIO helper program
    #[arg(long, env = "PINCTRL_PROGRAM", default_value = "pinctrl", hide = true)]
    pub pinctrl_program: String,
}

/// Validated monitor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub targets: Vec<String>,
    pub policy: TimingPolicy,
    pub ping_timeout: Duration,
    pub gpio_pin: u32,
    pub metrics_addr: SocketAddr,
    pub dry_run: bool,
    pub ping_program: String,
    pub pinctrl_program: String,
}

impl Cli {
    /// Validate the raw options.
    pub fn into_config(self) -> Result<MonitorConfig, ConfigError> {
        let targets = parse_targets(&self.ping_targets)?;
        let metrics_addr = parse_metrics_addr(&self.metrics_addr)?;

        if self.ping_timeout.is_zero() {
            return Err(ConfigError::ZeroPingTimeout);
        }

        let policy = TimingPolicy::builder()
            .ping_interval(self.ping_interval)
            .investigate_interval(self.investigate_interval)
            .investigate_duration(self.investigate_duration)
            .reset_duration(self.reset_duration)
            .recover_timeout(self.recover_timeout)
            .build()?;

        Ok(MonitorConfig {
            targets,
            policy,
            ping_timeout: self.ping_timeout,
            gpio_pin: self.gpio_pin,
            metrics_addr,
            dry_run: self.dry_run,
            ping_program: self.ping_program,
            pinctrl_program: self.pinctrl_program,
        })
    }
}

impl MonitorConfig {
    /// Log the startup line with the effective configuration, then warn
    /// about suspicious combinations.
    pub fn log_effective(&self) {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            targets = ?self.targets,
            ping_interval = ?self.policy.ping_interval,
            investigate_interval = ?self.policy.investigate_interval,
            investigate_duration = ?self.policy.investigate_duration,
            reset_duration = ?self.policy.reset_duration,
            recover_timeout = ?self.policy.recover_timeout,
            ping_timeout = ?self.ping_timeout,
            gpio_pin = self.gpio_pin,
            metrics_addr = %self.metrics_addr,
            dry_run = self.dry_run,
            "starting modem monitor"
        );

        if !self.policy.allows_repeated_investigation() {
            warn!(
                investigate_interval = ?self.policy.investigate_interval,
                investigate_duration = ?self.policy.investigate_duration,
                "investigate interval is not shorter than the investigation window; \
                 an outage will be confirmed after at most one probe"
            );
        }
    }
}

/// Split a comma-separated target list, dropping blanks.
pub fn parse_targets(raw: &str) -> Result<Vec<String>, ConfigError> {
    let targets: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if targets.is_empty() {
        Err(ConfigError::NoTargets)
    } else {
        Ok(targets)
    }
}

/// Parse a listen address, treating a bare `:port` as all interfaces.
pub fn parse_metrics_addr(raw: &str) -> Result<SocketAddr, ConfigError> {
    let raw = raw.trim();
    let full = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => raw.to_string(),
    };

    full.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidMetricsAddr {
        addr: raw.to_string(),
        reason: e.to_string(),
    })
}
