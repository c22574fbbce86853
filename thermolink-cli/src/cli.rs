use std::path::PathBuf;

use clap::Parser;

/// Thermolink device agent: measures the environment on a fixed interval,
/// publishes readings to the time-series channel over a pinned TLS anchor,
/// and notifies the webhook service of lifecycle and delivery events.
#[derive(Debug, Parser)]
#[command(name = "thermolink", version, about)]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "THERMOLINK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the measurement interval in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<f64>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
