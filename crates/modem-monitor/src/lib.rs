//! Modem monitor service
//!
//! Process plumbing around [`modem_watchdog`]: configuration, the `ping`
//! probe, the `pinctrl` relay, Prometheus metrics, and the daemon lifecycle.

pub mod config;
pub mod daemon;
pub mod error;
pub mod observability;
pub mod probe;
pub mod relay;

pub use config::{Cli, MonitorConfig};
pub use daemon::MonitorDaemon;
pub use error::ConfigError;
pub use observability::{MetricsServer, PrometheusSink, init_logging};
pub use probe::PingProbe;
pub use relay::PinctrlRelay;
