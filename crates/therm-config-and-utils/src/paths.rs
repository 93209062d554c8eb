//! File system paths for the daemon.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the daemon.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for daemon files (~/.w1-therm)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.w1-therm`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".w1-therm"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.w1-therm).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.w1-therm/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the local buffer database path (~/.w1-therm/w1_therm.db).
    pub fn database_file(&self) -> PathBuf {
        self.base_dir.join("w1_therm.db")
    }

    /// Get the PID file path (~/.w1-therm/w1-therm.pid).
    pub fn pid_file(&self) -> PathBuf {
        self.base_dir.join("w1-therm.pid")
    }

    /// Get the logs directory (~/.w1-therm/logs).
    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    /// Get the structured log file path (~/.w1-therm/logs/w1-therm.jsonl).
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("w1-therm.jsonl")
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
