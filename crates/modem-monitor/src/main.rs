//! Modem monitor daemon (modem-monitor)

use anyhow::{Context, Result};
use clap::Parser;
use modem_monitor::{Cli, MonitorDaemon, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = cli.into_config().context("Invalid configuration")?;
    config.log_effective();

    MonitorDaemon::new(config).run().await
}
