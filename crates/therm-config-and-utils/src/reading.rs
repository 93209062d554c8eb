//! The reading value that flows from the sensor to the storage engine, and the two
//! seams the poll loop drives.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Longest sensor name, in bytes, that every storage path accepts.
pub const MAX_SENSOR_NAME_LEN: usize = 64;

/// One sampled `(name, value, timestamp)` triple.
///
/// The value is passed through untouched by every storage path; unit conversion happens
/// at the sensor boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Logical sensor name, written as the `name` tag remotely.
    pub sensor_name: String,
    /// Sampled value.
    pub value: f64,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

impl Reading {
    /// Create a reading with an explicit timestamp.
    pub fn new(sensor_name: impl Into<String>, value: f64, timestamp: i64) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            value,
            timestamp,
        }
    }

    /// Create a reading stamped with the current wall-clock time.
    pub fn now(sensor_name: impl Into<String>, value: f64) -> Self {
        Self::new(sensor_name, value, Utc::now().timestamp())
    }
}

/// Something that can produce a reading on demand.
///
/// `None` means the sensor is transiently unreadable; callers treat it as a missing
/// sample, not an error.
pub trait SensorSource {
    fn read(&mut self) -> Option<Reading>;
}

/// Something that accepts readings.
///
/// Implementations own their failure handling: nothing is returned to the caller, so a
/// storage fault can never stop the poll loop.
pub trait ReadingRecorder {
    fn record(&mut self, reading: &Reading);
}

impl<T: ReadingRecorder + ?Sized> ReadingRecorder for Box<T> {
    fn record(&mut self, reading: &Reading) {
        (**self).record(reading)
    }
}

impl<T: ReadingRecorder + ?Sized> ReadingRecorder for &mut T {
    fn record(&mut self, reading: &Reading) {
        (**self).record(reading)
    }
}
