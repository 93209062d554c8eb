//! Process lifecycle for the w1-therm daemon.
//!
//! Handles singleton enforcement through the PID file, PID file management, and
//! turning SIGINT/SIGTERM into a cooperative stop flag.

use signal_hook::consts::{SIGINT, SIGTERM};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from lifecycle management.
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Daemon is already running (pid {0})")]
    AlreadyRunning(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PID file error: {0}")]
    PidFile(String),
}

/// Result of checking whether another daemon owns the PID file.
#[derive(Debug, PartialEq, Eq)]
pub enum SingletonCheck {
    /// No daemon running, safe to start.
    Available,
    /// A PID file for a dead process (or with garbage content) was removed.
    StalePidCleaned,
    /// Another daemon is alive.
    AlreadyRunning(u32),
}

/// Check the PID file for a live daemon, removing it if the recorded process is gone.
pub fn check_singleton(pid_path: &Path) -> SingletonCheck {
    let pid = match read_pid_file(pid_path) {
        Ok(None) => return SingletonCheck::Available,
        Ok(Some(pid)) => Some(pid),
        Err(_) => None,
    };

    if let Some(pid) = pid {
        if pid != std::process::id() && process_alive(pid) {
            return SingletonCheck::AlreadyRunning(pid);
        }
    }

    let _ = std::fs::remove_file(pid_path);
    debug!(pid_path = %pid_path.display(), ?pid, "Removed stale PID file");
    SingletonCheck::StalePidCleaned
}

/// Fail with [`LifecycleError::AlreadyRunning`] if another daemon is alive.
pub fn ensure_singleton(pid_path: &Path) -> Result<(), LifecycleError> {
    match check_singleton(pid_path) {
        SingletonCheck::AlreadyRunning(pid) => Err(LifecycleError::AlreadyRunning(pid)),
        SingletonCheck::Available | SingletonCheck::StalePidCleaned => Ok(()),
    }
}

/// Whether a process with this PID exists.
pub fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

/// Write the current process PID to the given path.
pub fn write_pid_file(pid_path: &Path) -> Result<u32, LifecycleError> {
    let pid = std::process::id();
    if let Some(parent) = pid_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(pid_path, pid.to_string())?;
    Ok(pid)
}

/// Read a PID from the given file.
pub fn read_pid_file(pid_path: &Path) -> Result<Option<u32>, LifecycleError> {
    if !pid_path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(pid_path)?;
    let pid = content
        .trim()
        .parse::<u32>()
        .map_err(|e| LifecycleError::PidFile(format!("Invalid PID: {}", e)))?;
    Ok(Some(pid))
}

/// Clean up PID file if it exists.
pub fn cleanup_pid_file(pid_path: &Path) -> Result<(), LifecycleError> {
    if pid_path.exists() {
        std::fs::remove_file(pid_path)?;
    }
    Ok(())
}

/// Register SIGINT and SIGTERM to set the returned flag.
///
/// The flag is only set; the poll loop notices it between sleep steps.
pub fn install_shutdown_flag() -> Result<Arc<AtomicBool>, LifecycleError> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag))?;
    }
    info!("Shutdown signal handlers installed");
    Ok(flag)
}

/// Information about a (possibly) running daemon.
#[derive(Debug, Clone)]
pub struct DaemonInfo {
    pub pid: Option<u32>,
    pub pid_path: PathBuf,
}

impl DaemonInfo {
    pub fn new(pid_path: PathBuf) -> Self {
        Self {
            pid: None,
            pid_path,
        }
    }

    /// Load PID from the PID file.
    pub fn load_pid(&mut self) -> Result<(), LifecycleError> {
        self.pid = read_pid_file(&self.pid_path)?;
        Ok(())
    }

    /// Whether the loaded PID belongs to a live process.
    pub fn is_running(&self) -> bool {
        self.pid.is_some_and(process_alive)
    }
}
