//! Single-store recording for the `local` and `remote` storage modes.

use crate::EngineResult;
use influx_sink_client::InfluxClient;
use reading_buffer_sqlite::ReadingBuffer;
use therm_config_and_utils::{Reading, ReadingRecorder};
use tracing::{debug, warn};

/// A store that accepts one point at a time.
pub trait PointStore {
    fn insert(&self, name: &str, value: f64, timestamp: i64) -> EngineResult<()>;
}

impl PointStore for ReadingBuffer {
    fn insert(&self, name: &str, value: f64, timestamp: i64) -> EngineResult<()> {
        self.append(name, value, timestamp)?;
        Ok(())
    }
}

impl PointStore for InfluxClient {
    fn insert(&self, name: &str, value: f64, timestamp: i64) -> EngineResult<()> {
        self.insert_one(name, value, timestamp)?;
        Ok(())
    }
}

/// Exactly one store, chosen at startup.
pub enum StorageBackend<L = ReadingBuffer, R = InfluxClient> {
    Local(L),
    Remote(R),
}

impl<L: PointStore, R: PointStore> StorageBackend<L, R> {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Local(_) => "local",
            StorageBackend::Remote(_) => "remote",
        }
    }

    pub fn insert(&self, name: &str, value: f64, timestamp: i64) -> EngineResult<()> {
        match self {
            StorageBackend::Local(store) => store.insert(name, value, timestamp),
            StorageBackend::Remote(store) => store.insert(name, value, timestamp),
        }
    }
}

impl<L: PointStore, R: PointStore> ReadingRecorder for StorageBackend<L, R> {
    fn record(&mut self, reading: &Reading) {
        match self.insert(&reading.sensor_name, reading.value, reading.timestamp) {
            Ok(()) => debug!(
                backend = self.kind(),
                name = %reading.sensor_name,
                value = reading.value,
                "Reading stored"
            ),
            Err(e) => warn!(
                backend = self.kind(),
                name = %reading.sensor_name,
                value = reading.value,
                timestamp = reading.timestamp,
                error = %e,
                "Failed to store reading"
            ),
        }
    }
}
