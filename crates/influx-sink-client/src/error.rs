//! Sink error types.

use thiserror::Error;

/// Failure of the remote sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// A required setting is missing or malformed. Raised at construction only.
    #[error("Configuration error: {0}")]
    Config(String),

    /// InfluxDB answered with a non-success status.
    #[error("InfluxDB responded {status}: {message}")]
    Status { status: u16, message: String },

    /// The point cannot be expressed in line protocol (NaN or infinity).
    #[error("Invalid point: {0}")]
    InvalidPoint(String),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SinkError {
    /// HTTP status of the failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SinkError::Status { status, .. } => Some(*status),
            SinkError::Http(e) => e.status().map(|s| s.as_u16()),
            SinkError::Config(_) | SinkError::InvalidPoint(_) => None,
        }
    }
}

/// Result type alias using SinkError.
pub type SinkResult<T> = Result<T, SinkError>;
