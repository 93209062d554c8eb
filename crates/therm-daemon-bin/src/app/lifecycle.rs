//! One-shot commands (status, flush).

use super::init::open_buffer;
use anyhow::bail;
use buffered_sync_engine::{BufferedSyncEngine, EngineConfig};
use influx_sink_client::InfluxClient;
use therm_config_and_utils::{Config, Paths};
use therm_lifecycle::DaemonInfo;
use tracing::info;

/// Print daemon, buffer and bucket status.
pub fn check_status(config: &Config, paths: &Paths) -> anyhow::Result<()> {
    let mut daemon = DaemonInfo::new(paths.pid_file());
    if let Err(e) = daemon.load_pid() {
        println!("PID file unreadable: {}", e);
    }

    match daemon.pid {
        Some(pid) if daemon.is_running() => println!("Daemon is running (PID {})", pid),
        Some(pid) => println!("Daemon is not running (stale PID {})", pid),
        None => println!("Daemon is not running"),
    }

    let db_path = config.database_path(paths);
    if db_path.exists() {
        let buffer = open_buffer(config, paths)?;
        println!("  Buffered: {} readings", buffer.pending_count()?);
        println!("  Database: {}", db_path.display());
    } else {
        println!("  Buffered: 0 readings (no database yet)");
    }

    match InfluxClient::new(&config.influx) {
        Ok(client) => {
            let state = if client.bucket_ready() {
                "ready"
            } else {
                "not reachable"
            };
            println!("  Bucket:   {} ({})", client.bucket(), state);
        }
        Err(e) => println!("  Bucket:   not configured ({})", e),
    }

    Ok(())
}

/// Push every buffered reading to InfluxDB now.
pub fn flush_buffer(config: &Config, paths: &Paths) -> anyhow::Result<()> {
    let client = InfluxClient::new(&config.influx)?;
    if !client.bucket_ready() {
        bail!("bucket {:?} is not reachable, nothing flushed", client.bucket());
    }

    let buffer = open_buffer(config, paths)?;
    let mut engine = BufferedSyncEngine::new(buffer, client, EngineConfig::from(&config.storage));
    let pending = engine.pending_count()?;
    let report = engine.flush()?;

    info!(
        pending,
        batches = report.batches,
        records = report.records,
        skipped = report.skipped,
        "Manual flush finished"
    );
    println!(
        "Flushed {} readings in {} batches ({} remain)",
        report.records,
        report.batches,
        engine.pending_count()?
    );
    if report.skipped > 0 {
        println!("Discarded {} unsendable readings", report.skipped);
    }
    Ok(())
}
