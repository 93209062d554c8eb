//! The buffered dual writer.

use crate::{EngineResult, LocalBuffer, RemoteSink};
use therm_config_and_utils::{Reading, ReadingRecorder, StorageConfig};
use tracing::{debug, info, warn};

/// Engine policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Write straight to the remote sink while nothing has been buffered since the last
    /// flush. A failed direct write drops the reading.
    pub direct_write_when_idle: bool,
    /// Probe the sink and flush on every n-th buffered insert.
    pub flush_every: u64,
    /// Records per batch request.
    pub page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            direct_write_when_idle: true,
            flush_every: 10,
            page_size: 200,
        }
    }
}

impl From<&StorageConfig> for EngineConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            direct_write_when_idle: config.direct_write_when_idle,
            flush_every: config.flush_every,
            page_size: config.page_size,
        }
    }
}

/// What a flush delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Batches acknowledged by the sink and purged locally.
    pub batches: usize,
    /// Records in those batches.
    pub records: usize,
    /// Buffered records the sink can never accept (NaN, infinity), dropped with their page.
    pub skipped: usize,
    /// Highest id purged, if any.
    pub last_purged_id: Option<i64>,
}

/// Where one reading ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Written straight to the remote sink.
    DirectWritten,
    /// Direct write failed; the reading is gone.
    DirectDropped,
    /// Appended to the local buffer. `flush` is set when this insert triggered a flush
    /// attempt against a ready sink.
    Buffered { flush: Option<FlushReport> },
    /// The local append failed; the reading is gone.
    BufferFailed,
}

/// Dual writer over a local buffer and a remote sink.
///
/// The sync counter counts buffered inserts since the last acknowledged batch. It is
/// only a trigger: the local buffer stays the source of truth for what is undelivered.
pub struct BufferedSyncEngine<L, R> {
    local: L,
    remote: R,
    config: EngineConfig,
    sync_counter: u64,
}

impl<L: LocalBuffer, R: RemoteSink> BufferedSyncEngine<L, R> {
    pub fn new(local: L, remote: R, config: EngineConfig) -> Self {
        let config = EngineConfig {
            flush_every: config.flush_every.max(1),
            page_size: config.page_size.max(1),
            ..config
        };

        Self {
            local,
            remote,
            config,
            sync_counter: 0,
        }
    }

    /// Start with a pre-set sync counter.
    pub fn with_sync_counter(mut self, counter: u64) -> Self {
        self.sync_counter = counter;
        self
    }

    pub fn sync_counter(&self) -> u64 {
        self.sync_counter
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Records waiting in the local buffer.
    pub fn pending_count(&self) -> EngineResult<u64> {
        Ok(self.local.pending_count()?)
    }

    /// Store one reading. Faults are logged and reflected in the outcome, never returned.
    pub fn record(&mut self, name: &str, value: f64, timestamp: i64) -> RecordOutcome {
        if self.config.direct_write_when_idle && self.sync_counter == 0 {
            return match self.remote.insert_one(name, value, timestamp) {
                Ok(()) => {
                    debug!(name, value, timestamp, "Reading written to remote");
                    RecordOutcome::DirectWritten
                }
                Err(e) => {
                    warn!(
                        name,
                        value,
                        timestamp,
                        error = %e,
                        "Direct remote write failed, reading dropped"
                    );
                    RecordOutcome::DirectDropped
                }
            };
        }

        self.sync_counter += 1;

        if let Err(e) = self.local.append(name, value, timestamp) {
            warn!(
                name,
                value,
                timestamp,
                sync_counter = self.sync_counter,
                error = %e,
                "Failed to buffer reading, reading lost"
            );
            return RecordOutcome::BufferFailed;
        }

        if self.sync_counter % self.config.flush_every != 0 {
            return RecordOutcome::Buffered { flush: None };
        }

        if !self.remote.bucket_ready() {
            debug!(
                sync_counter = self.sync_counter,
                "Remote bucket not ready, keeping readings buffered"
            );
            return RecordOutcome::Buffered { flush: None };
        }

        let mut report = FlushReport::default();
        if let Err(e) = self.drain(&mut report) {
            warn!(
                batches = report.batches,
                records = report.records,
                sync_counter = self.sync_counter,
                error = %e,
                "Flush aborted, remaining readings stay buffered"
            );
        }

        RecordOutcome::Buffered {
            flush: Some(report),
        }
    }

    /// Drain the local buffer now, without probing the sink first.
    ///
    /// Stops at the first failing batch; everything from that batch on stays buffered.
    pub fn flush(&mut self) -> EngineResult<FlushReport> {
        let mut report = FlushReport::default();
        self.drain(&mut report)?;
        Ok(report)
    }

    fn drain(&mut self, report: &mut FlushReport) -> EngineResult<()> {
        let mut payload = String::new();

        loop {
            let batch = self.local.scan(self.config.page_size)?;
            let Some(max_id) = batch.iter().map(|r| r.id).max() else {
                break;
            };

            payload.clear();
            let mut skipped = 0;
            for record in &batch {
                if let Err(e) = self.remote.append_line(
                    &mut payload,
                    &record.name,
                    record.value,
                    record.timestamp,
                ) {
                    warn!(
                        id = record.id,
                        name = %record.name,
                        value = record.value,
                        error = %e,
                        "Discarding buffered reading the sink cannot accept"
                    );
                    skipped += 1;
                }
            }
            let delivered = batch.len() - skipped;

            // A page of nothing but unsendable records is purged without a request.
            if delivered > 0 {
                self.remote.insert_batch(&payload)?;
            }
            let purged = self.local.purge_up_to(max_id)?;

            self.sync_counter = 0;
            if delivered > 0 {
                report.batches += 1;
            }
            report.records += delivered;
            report.skipped += skipped;
            report.last_purged_id = Some(max_id);

            debug!(
                records = delivered,
                skipped,
                purged,
                max_id,
                "Batch delivered and purged"
            );

            // Nothing removed means the next scan returns the same page.
            if purged == 0 {
                warn!(max_id, "Purge removed no records, stopping flush");
                break;
            }
        }

        if report.last_purged_id.is_some() {
            info!(
                batches = report.batches,
                records = report.records,
                skipped = report.skipped,
                last_purged_id = ?report.last_purged_id,
                "Buffered readings flushed"
            );
        }

        Ok(())
    }
}

impl<L: LocalBuffer, R: RemoteSink> ReadingRecorder for BufferedSyncEngine<L, R> {
    fn record(&mut self, reading: &Reading) {
        BufferedSyncEngine::record(self, &reading.sensor_name, reading.value, reading.timestamp);
    }
}
