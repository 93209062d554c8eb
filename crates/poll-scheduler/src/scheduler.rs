//! The run loop.

use crate::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use therm_config_and_utils::{PollConfig, ReadingRecorder, SensorSource};
use tracing::{debug, info, warn};

const MIN_STEP: Duration = Duration::from_millis(1);

/// Scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between fire times.
    pub interval: Duration,
    /// Longest single sleep; bounds how long a stop request can go unnoticed.
    pub tick: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            tick: Duration::from_millis(250),
        }
    }
}

impl From<&PollConfig> for SchedulerConfig {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            tick: Duration::from_millis(config.tick_millis),
        }
    }
}

/// Counters for one `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Fire times that were served.
    pub ticks: u64,
    /// Ticks that produced a reading.
    pub readings: u64,
    /// Fire times skipped after a stall.
    pub missed: u64,
}

/// Fixed-interval sampling loop.
pub struct PollScheduler {
    config: SchedulerConfig,
    stop: Arc<AtomicBool>,
}

impl PollScheduler {
    pub fn new(config: SchedulerConfig, stop: Arc<AtomicBool>) -> Self {
        let config = SchedulerConfig {
            interval: config.interval.max(MIN_STEP),
            tick: config.tick.max(MIN_STEP),
        };
        Self { config, stop }
    }

    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Request the loop to stop. Same effect as setting the shared flag.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Sample `sensor` and feed `recorder` until the stop flag is set.
    pub fn run<C, S, R>(&self, clock: &C, sensor: &mut S, recorder: &mut R) -> RunSummary
    where
        C: Clock,
        S: SensorSource,
        R: ReadingRecorder,
    {
        let interval = self.config.interval;
        let mut summary = RunSummary::default();
        let mut next_fire = clock.now();

        info!(
            interval_secs = interval.as_secs_f64(),
            tick_ms = self.config.tick.as_millis() as u64,
            "Poll scheduler started"
        );

        while !self.is_stopped() {
            let now = clock.now();

            if now < next_fire {
                clock.sleep((next_fire - now).min(self.config.tick));
                continue;
            }

            let skipped = skip_missed(&mut next_fire, now, interval);
            if skipped > 0 {
                warn!(
                    missed = skipped,
                    behind_secs = now.duration_since(next_fire).as_secs_f64(),
                    "Scheduler fell behind, skipping missed polls"
                );
                summary.missed += skipped;
            }

            summary.ticks += 1;
            match sensor.read() {
                Some(reading) => {
                    summary.readings += 1;
                    recorder.record(&reading);
                }
                None => debug!(tick = summary.ticks, "No reading this tick"),
            }

            next_fire += interval;
        }

        info!(
            ticks = summary.ticks,
            readings = summary.readings,
            missed = summary.missed,
            "Poll scheduler stopped"
        );
        summary
    }
}

/// Move `next_fire` to the latest slot not after `now`, returning how many slots it passed.
fn skip_missed(next_fire: &mut Instant, now: Instant, interval: Duration) -> u64 {
    let mut skipped = 0;
    while now.duration_since(*next_fire) >= interval {
        *next_fire += interval;
        skipped += 1;
    }
    skipped
}
