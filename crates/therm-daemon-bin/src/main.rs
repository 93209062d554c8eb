//! w1-therm - Samples a 1-Wire thermometer and ships readings to InfluxDB through a
//! local SQLite buffer.

mod app;
mod cli;

use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use therm_config_and_utils::{init_logging, Config, LogSettings, Paths};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = match cli.base_dir {
        Some(base) => Paths::with_base_dir(base),
        None => Paths::new()?,
    };
    let mut config = match &cli.config {
        Some(path) => Config::load_or_default(path)?,
        None => Config::load(&paths)?,
    };
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let command = cli.command.unwrap_or(Commands::Run(RunArgs::default()));
    if let Commands::Run(args) = &command {
        app::apply_run_overrides(&mut config, args)?;
    }

    init_logging(&LogSettings {
        default_level: app::log_filter(&config.log_level),
        log_path: Some(paths.log_file()),
        also_stderr: true,
    })?;

    match command {
        Commands::Run(_) => app::run_daemon(config, paths),
        Commands::Status => app::check_status(&config, &paths),
        Commands::Flush => app::flush_buffer(&config, &paths),
    }
}
