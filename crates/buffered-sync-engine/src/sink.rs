//! Storage seams driven by the engine.

use influx_sink_client::{InfluxClient, SinkResult};
use reading_buffer_sqlite::{LocalRecord, ReadingBuffer, StoreResult};

/// Durable local buffer keyed by a monotonically increasing id.
pub trait LocalBuffer {
    /// Persist a reading and return its id.
    fn append(&self, name: &str, value: f64, timestamp: i64) -> StoreResult<i64>;

    /// Up to `limit` records, oldest first.
    fn scan(&self, limit: usize) -> StoreResult<Vec<LocalRecord>>;

    /// Delete every record with `id <= up_to`.
    fn purge_up_to(&self, up_to: i64) -> StoreResult<usize>;

    /// Number of records waiting for delivery.
    fn pending_count(&self) -> StoreResult<u64>;
}

/// Remote time-series sink.
pub trait RemoteSink {
    fn insert_one(&self, name: &str, value: f64, timestamp: i64) -> SinkResult<()>;

    /// Send a payload built with [`RemoteSink::append_line`] in one request.
    fn insert_batch(&self, payload: &str) -> SinkResult<()>;

    /// Liveness probe. Never fails; any problem reads as `false`.
    fn bucket_ready(&self) -> bool;

    /// Append the wire form of one reading to a batch payload.
    ///
    /// A reading the sink can never accept is an error and leaves `payload` unchanged.
    fn append_line(
        &self,
        payload: &mut String,
        name: &str,
        value: f64,
        timestamp: i64,
    ) -> SinkResult<()>;
}

impl LocalBuffer for ReadingBuffer {
    fn append(&self, name: &str, value: f64, timestamp: i64) -> StoreResult<i64> {
        ReadingBuffer::append(self, name, value, timestamp)
    }

    fn scan(&self, limit: usize) -> StoreResult<Vec<LocalRecord>> {
        ReadingBuffer::scan(self, limit)
    }

    fn purge_up_to(&self, up_to: i64) -> StoreResult<usize> {
        ReadingBuffer::purge_up_to(self, up_to)
    }

    fn pending_count(&self) -> StoreResult<u64> {
        ReadingBuffer::pending_count(self)
    }
}

impl RemoteSink for InfluxClient {
    fn insert_one(&self, name: &str, value: f64, timestamp: i64) -> SinkResult<()> {
        InfluxClient::insert_one(self, name, value, timestamp)
    }

    fn insert_batch(&self, payload: &str) -> SinkResult<()> {
        InfluxClient::insert_batch(self, payload)
    }

    fn bucket_ready(&self) -> bool {
        InfluxClient::bucket_ready(self)
    }

    fn append_line(
        &self,
        payload: &mut String,
        name: &str,
        value: f64,
        timestamp: i64,
    ) -> SinkResult<()> {
        InfluxClient::append_line(self, payload, name, value, timestamp)
    }
}
