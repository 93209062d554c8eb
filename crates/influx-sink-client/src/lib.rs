//! InfluxDB v2 sink for the w1-therm daemon.
//!
//! This crate provides:
//! - InfluxClient: blocking writer for single points and pre-built batches
//! - line_protocol: formatting of one reading into an InfluxDB line
//! - a bucket readiness probe used as a liveness signal before flushing the local buffer

mod client;
mod error;
pub mod line_protocol;

#[cfg(test)]
mod test_server;

pub use client::{bucket_listed, InfluxClient};
pub use error::{SinkError, SinkResult};
