//! Durability and truncation tests for the reading buffer.
//!
//! - `durability.rs` - ids and records survive reopening the file
//! - `truncation.rs` - purge semantics (idempotence, monotonic truncation)
