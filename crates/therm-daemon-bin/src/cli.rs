//! Command-line interface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// w1-therm command-line interface.
#[derive(Parser, Debug)]
#[command(name = "w1-therm")]
#[command(about = "Buffered 1-Wire temperature logger for InfluxDB")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level or filter (trace, debug, info, warn, error). Overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Base directory for runtime files (config, database, PID, logs). Defaults to ~/.w1-therm
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Config file to use instead of <base-dir>/config.json
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the sensor until SIGINT/SIGTERM (default)
    Run(RunArgs),
    /// Show daemon, buffer and bucket status
    Status,
    /// Push all buffered readings to InfluxDB now
    Flush,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Path of the sensor's w1_slave file
    #[arg(short = 'p', long)]
    pub sensor_path: Option<PathBuf>,

    /// Sensor name, stored as the `name` tag
    #[arg(short = 'n', long)]
    pub sensor_name: Option<String>,

    /// InfluxDB connection as host/org/bucket/token
    #[arg(long, value_name = "HOST/ORG/BUCKET/TOKEN")]
    pub influx: Option<String>,
}
