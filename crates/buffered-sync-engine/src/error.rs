//! Engine error types.

use influx_sink_client::SinkError;
use reading_buffer_sqlite::StoreError;
use thiserror::Error;

/// Failure of one flush or single-store write.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Local buffer could not be read, written or truncated.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Remote sink rejected or did not receive a write.
    #[error("Remote error: {0}")]
    Remote(#[from] SinkError),
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
