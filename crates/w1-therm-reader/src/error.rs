//! Sensor error types.

use thiserror::Error;

/// Why a sample could not be taken.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No `w1_slave` path was configured.
    #[error("Sensor path is not configured")]
    MissingPath,

    /// The file was readable but not in the expected format.
    #[error("Malformed sample: {0}")]
    Malformed(String),
}

/// Result type alias using SensorError.
pub type SensorResult<T> = Result<T, SensorError>;
