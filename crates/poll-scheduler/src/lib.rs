//! # PollScheduler: sampling cadence for the w1-therm daemon
//!
//! Drives one sensor at a fixed interval and hands every reading to a recorder
//! (the buffered sync engine or a single storage backend).
//!
//! ## Timing
//!
//! ```text
//!  start            +interval          +2*interval        +3*interval
//!    │ tick             │ tick              │ (host asleep)     │ tick
//!    ▼                  ▼                   ▼                   ▼
//!    ├──sleep≤tick──┬──sleep≤tick──┬─ ...   ┊  missed slot      ├── ...
//!                   └ stop flag checked after every sleep step
//! ```
//!
//! - The first tick fires immediately.
//! - Fire times are `start + k * interval`; time spent reading and storing does not
//!   shift later ticks.
//! - After a stall longer than one interval, the slots that passed are counted as missed
//!   and only the latest one fires.
//! - Sleeping happens in steps of at most `tick`, so a stop request is seen within one
//!   step. A sensor read or remote write already in progress runs to completion.
//!
//! Time comes from a [`Clock`]; production uses [`SystemClock`].

mod clock;
mod scheduler;

pub use clock::{Clock, SystemClock};
pub use scheduler::{PollScheduler, RunSummary, SchedulerConfig};
