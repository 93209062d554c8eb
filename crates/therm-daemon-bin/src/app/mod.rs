//! Application wiring and lifecycle management.

mod init;
mod lifecycle;

pub use init::{apply_run_overrides, log_filter, run_daemon};
pub use lifecycle::{check_status, flush_buffer};
