//! Local buffer error types.

use thiserror::Error;

/// Failure of the local durable store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error (disk full, corruption, locked database)
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error while preparing the database location
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sensor name rejected before reaching SQLite
    #[error("Invalid sensor name: {0}")]
    InvalidName(String),

    /// NaN or infinity, which neither SQLite nor the remote sink can hold
    #[error("Invalid reading value: {0}")]
    InvalidValue(f64),
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;
