//! Configuration management for the daemon.

use crate::{CoreError, CoreResult, Paths, MAX_SENSOR_NAME_LEN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const DEFAULT_SENSOR_NAME: &str = "w1_therm";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
const DEFAULT_TICK_MILLIS: u64 = 250;
const DEFAULT_FLUSH_EVERY: u64 = 10;
const DEFAULT_PAGE_SIZE: usize = 200;
const DEFAULT_MEASUREMENT: &str = "home";
const DEFAULT_FIELD: &str = "temperature";
const DEFAULT_INFLUX_TIMEOUT_SECS: u64 = 30;

/// Main daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sqlite: SqliteConfig,
    #[serde(default)]
    pub influx: InfluxConfig,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Unit the sensor value is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureUnit {
    /// Degrees Celsius as a float (raw value / 1000).
    #[default]
    Celsius,
    /// Raw millidegrees as reported by the kernel driver.
    Millidegrees,
}

/// Sensor source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Name written with every reading.
    pub name: String,
    /// Path to the `w1_slave` file of the thermometer.
    pub w1_slave_path: Option<PathBuf>,
    pub unit: TemperatureUnit,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SENSOR_NAME.to_string(),
            w1_slave_path: None,
            unit: TemperatureUnit::default(),
        }
    }
}

/// Sampling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between samples.
    pub interval_secs: u64,
    /// Sleep granularity while waiting; bounds stop latency.
    pub tick_millis: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            tick_millis: DEFAULT_TICK_MILLIS,
        }
    }
}

/// Where readings are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Remote first, local SQLite buffer with periodic flush.
    #[default]
    Buffered,
    /// Local SQLite only.
    Local,
    /// InfluxDB only; failed writes are dropped.
    Remote,
}

/// Buffered storage policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub mode: StorageMode,
    /// Write straight to InfluxDB while nothing is buffered.
    pub direct_write_when_idle: bool,
    /// Probe the bucket (and flush) every N buffered inserts.
    pub flush_every: u64,
    /// Records per flushed batch.
    pub page_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mode: StorageMode::default(),
            direct_write_when_idle: true,
            flush_every: DEFAULT_FLUSH_EVERY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Local buffer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file; defaults to `Paths::database_file()`.
    pub path: Option<PathBuf>,
}

/// InfluxDB v2 settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    /// `host[:port]`, optionally with an `http://` or `https://` prefix.
    pub host: String,
    pub org: String,
    pub bucket: String,
    pub token: String,
    pub measurement: String,
    pub field: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            org: String::new(),
            bucket: String::new(),
            token: String::new(),
            measurement: DEFAULT_MEASUREMENT.to_string(),
            field: DEFAULT_FIELD.to_string(),
            timeout_secs: DEFAULT_INFLUX_TIMEOUT_SECS,
        }
    }
}

impl InfluxConfig {
    /// Parse the compact `host/org/bucket/token` form.
    ///
    /// The token is everything after the third `/`, so tokens containing `/` survive.
    /// Measurement, field and timeout keep their defaults.
    pub fn from_compact(raw: &str) -> CoreResult<Self> {
        let mut parts = raw.trim().splitn(4, '/');
        let mut next = |what: &str| -> CoreResult<String> {
            match parts.next() {
                Some(part) if !part.is_empty() => Ok(part.to_string()),
                _ => Err(CoreError::Config(format!(
                    "invalid influx setting, {what} is missing (expected host/org/bucket/token)"
                ))),
            }
        };

        let host = next("host")?;
        let org = next("org")?;
        let bucket = next("bucket")?;
        let token = next("token")?;

        Ok(Self {
            host,
            org,
            bucket,
            token,
            ..Self::default()
        })
    }

    /// Copy the connection identity from `other`, keeping measurement, field and timeout.
    pub fn apply_compact(&mut self, other: InfluxConfig) {
        self.host = other.host;
        self.org = other.org;
        self.bucket = other.bucket;
        self.token = other.token;
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            sensor: SensorConfig::default(),
            poll: PollConfig::default(),
            storage: StorageConfig::default(),
            sqlite: SqliteConfig::default(),
            influx: InfluxConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default file location, falling back to defaults.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        Self::load_or_default(&paths.config_file())
    }

    /// Load configuration from `path` if it exists, otherwise use defaults.
    /// Environment overrides are applied in both cases.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };

        config.load_from_env();

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    ///
    /// The InfluxDB token can be kept out of the config file this way.
    fn load_from_env(&mut self) {
        if let Some(log_level) = non_empty_env("W1_THERM_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(token) = non_empty_env("W1_THERM_INFLUX_TOKEN") {
            self.influx.token = token;
        }
    }

    /// Resolve the SQLite database path.
    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        self.sqlite
            .path
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }

    /// Check settings the daemon cannot run without.
    ///
    /// InfluxDB identifiers are validated by the client itself when it is built.
    pub fn validate(&self) -> CoreResult<()> {
        if self.sensor.name.trim().is_empty() {
            return Err(CoreError::Config("sensor name is empty".to_string()));
        }
        if self.sensor.name.len() > MAX_SENSOR_NAME_LEN {
            return Err(CoreError::Config(format!(
                "sensor name is {} bytes, limit is {MAX_SENSOR_NAME_LEN}",
                self.sensor.name.len()
            )));
        }
        if self.sensor.w1_slave_path.is_none() {
            return Err(CoreError::Config("w1_slave path is not set".to_string()));
        }
        if self.poll.interval_secs == 0 {
            return Err(CoreError::Config(
                "poll interval must be at least one second".to_string(),
            ));
        }
        if self.poll.tick_millis == 0 {
            return Err(CoreError::Config("poll tick must be non-zero".to_string()));
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    let raw = std::env::var(name).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
