//! Buffered dual-writer storage for the w1-therm daemon.
//!
//! This crate provides:
//! - BufferedSyncEngine: writes readings straight to the remote sink when idle, buffers
//!   them locally otherwise, and drains the buffer in confirmed batches
//! - LocalBuffer / RemoteSink: the seams the engine drives, implemented for the SQLite
//!   reading buffer and the InfluxDB client
//! - StorageBackend: single-store recorder for the `local` and `remote` storage modes
//!
//! Delivery is at-least-once: a buffered record is only purged after the batch that
//! carried it was acknowledged, so a failed purge re-sends it on the next flush.

mod backend;
mod engine;
mod error;
mod sink;

#[cfg(test)]
mod tests;

pub use backend::{PointStore, StorageBackend};
pub use engine::{BufferedSyncEngine, EngineConfig, FlushReport, RecordOutcome};
pub use error::{EngineError, EngineResult};
pub use sink::{LocalBuffer, RemoteSink};
