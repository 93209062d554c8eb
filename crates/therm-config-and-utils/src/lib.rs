//! Core types, configuration, and utilities for the w1-therm daemon.

mod config;
mod error;
mod logging;
mod paths;
mod reading;

pub use config::{
    Config, InfluxConfig, PollConfig, SensorConfig, SqliteConfig, StorageConfig, StorageMode,
    TemperatureUnit, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level, LogFileWriter, LogSettings};
pub use paths::Paths;
pub use reading::{Reading, ReadingRecorder, SensorSource, MAX_SENSOR_NAME_LEN};
