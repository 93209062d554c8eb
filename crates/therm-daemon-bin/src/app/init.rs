//! Daemon startup and the run loop.

use crate::cli::RunArgs;
use anyhow::Context;
use buffered_sync_engine::{BufferedSyncEngine, EngineConfig, StorageBackend};
use influx_sink_client::InfluxClient;
use poll_scheduler::{PollScheduler, SchedulerConfig, SystemClock};
use reading_buffer_sqlite::ReadingBuffer;
use therm_config_and_utils::{
    parse_level, Config, CoreResult, InfluxConfig, Paths, ReadingRecorder, StorageMode,
};
use therm_lifecycle::{cleanup_pid_file, ensure_singleton, install_shutdown_flag, write_pid_file};
use tracing::{info, warn};
use w1_therm_reader::W1ThermReader;

/// Apply `run` flags on top of the loaded configuration.
pub fn apply_run_overrides(config: &mut Config, args: &RunArgs) -> CoreResult<()> {
    if let Some(path) = &args.sensor_path {
        config.sensor.w1_slave_path = Some(path.clone());
    }
    if let Some(name) = &args.sensor_name {
        config.sensor.name = name.clone();
    }
    if let Some(raw) = &args.influx {
        config.influx.apply_compact(InfluxConfig::from_compact(raw)?);
    }
    Ok(())
}

/// Normalize a bare level ("warning", "DEBUG"); full filter directives pass through.
pub fn log_filter(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        parse_level(level).to_string().to_lowercase()
    }
}

/// Run the daemon in the foreground until SIGINT/SIGTERM.
pub fn run_daemon(config: Config, paths: Paths) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;
    paths.ensure_dirs()?;

    let pid_path = paths.pid_file();
    ensure_singleton(&pid_path)?;
    let stop = install_shutdown_flag()?;

    let pid = write_pid_file(&pid_path)?;
    info!(
        pid,
        sensor = %config.sensor.name,
        mode = ?config.storage.mode,
        interval_secs = config.poll.interval_secs,
        "Daemon started"
    );

    let scheduler = PollScheduler::new(SchedulerConfig::from(&config.poll), stop);
    let result = poll_until_stopped(&config, &paths, scheduler);

    if let Err(e) = cleanup_pid_file(&pid_path) {
        warn!(error = %e, "Failed to remove PID file");
    }
    info!("Daemon stopped");

    result
}

fn poll_until_stopped(
    config: &Config,
    paths: &Paths,
    scheduler: PollScheduler,
) -> anyhow::Result<()> {
    let mut sensor = W1ThermReader::from_config(&config.sensor)?;
    let mut recorder = build_recorder(config, paths)?;

    let summary = scheduler.run(&SystemClock, &mut sensor, &mut recorder);
    info!(
        ticks = summary.ticks,
        readings = summary.readings,
        missed = summary.missed,
        "Polling finished"
    );
    Ok(())
}

/// Build the storage path selected by `storage.mode`.
pub(crate) fn build_recorder(
    config: &Config,
    paths: &Paths,
) -> anyhow::Result<Box<dyn ReadingRecorder>> {
    let recorder: Box<dyn ReadingRecorder> = match config.storage.mode {
        StorageMode::Buffered => {
            let buffer = open_buffer(config, paths)?;
            let client = InfluxClient::new(&config.influx)?;
            let pending = buffer.pending_count()?;
            let engine_config = EngineConfig::from(&config.storage);
            info!(pending, bucket = client.bucket(), "Buffered storage ready");
            if strands_backlog(pending, &engine_config) {
                warn!(
                    pending,
                    "Readings left buffered by an earlier run are only sent by `w1-therm flush`"
                );
            }
            Box::new(BufferedSyncEngine::new(buffer, client, engine_config))
        }
        StorageMode::Local => {
            let buffer = open_buffer(config, paths)?;
            info!(pending = buffer.pending_count()?, "Local storage ready");
            Box::new(StorageBackend::<ReadingBuffer, InfluxClient>::Local(buffer))
        }
        StorageMode::Remote => {
            let client = InfluxClient::new(&config.influx)?;
            info!(bucket = client.bucket(), "Remote storage ready");
            Box::new(StorageBackend::<ReadingBuffer, InfluxClient>::Remote(client))
        }
    };
    Ok(recorder)
}

/// With direct writes on, the engine never buffers and so never drains a backlog left
/// by an earlier run.
fn strands_backlog(pending: u64, config: &EngineConfig) -> bool {
    pending > 0 && config.direct_write_when_idle
}

pub(crate) fn open_buffer(config: &Config, paths: &Paths) -> anyhow::Result<ReadingBuffer> {
    let path = config.database_path(paths);
    ReadingBuffer::open(&path)
        .with_context(|| format!("cannot open reading buffer at {}", path.display()))
}
