//! Engine tests against in-process fakes.

mod scenarios;

use crate::{BufferedSyncEngine, EngineConfig, LocalBuffer, RemoteSink};
use influx_sink_client::{SinkError, SinkResult};
use reading_buffer_sqlite::{LocalRecord, ReadingBuffer, StoreError, StoreResult};
use std::cell::{Cell, RefCell};
use std::io;

/// Remote sink that records every call and fails on demand.
#[derive(Default)]
pub(crate) struct RecordingRemote {
    pub direct_fails: Cell<bool>,
    pub ready: Cell<bool>,
    /// Number of batches to accept before rejecting every further one.
    pub batches_before_failure: Cell<Option<usize>>,
    pub direct_calls: Cell<usize>,
    pub batch_calls: Cell<usize>,
    pub probes: Cell<usize>,
    /// Lines acknowledged, direct and batched.
    pub delivered: RefCell<Vec<String>>,
}

impl RecordingRemote {
    pub fn ready() -> Self {
        let remote = Self::default();
        remote.ready.set(true);
        remote
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.borrow().len()
    }
}

fn unavailable() -> SinkError {
    SinkError::Status {
        status: 503,
        message: "service unavailable".to_string(),
    }
}

impl RemoteSink for RecordingRemote {
    fn insert_one(&self, name: &str, value: f64, timestamp: i64) -> SinkResult<()> {
        self.direct_calls.set(self.direct_calls.get() + 1);
        if self.direct_fails.get() {
            return Err(unavailable());
        }
        let mut line = String::new();
        self.append_line(&mut line, name, value, timestamp)?;
        self.delivered.borrow_mut().push(line);
        Ok(())
    }

    fn insert_batch(&self, payload: &str) -> SinkResult<()> {
        let accepted = self.batch_calls.get();
        self.batch_calls.set(accepted + 1);
        if let Some(limit) = self.batches_before_failure.get() {
            if accepted >= limit {
                return Err(unavailable());
            }
        }
        self.delivered
            .borrow_mut()
            .extend(payload.lines().map(|l| format!("{l}\n")));
        Ok(())
    }

    fn bucket_ready(&self) -> bool {
        self.probes.set(self.probes.get() + 1);
        self.ready.get()
    }

    fn append_line(
        &self,
        payload: &mut String,
        name: &str,
        value: f64,
        timestamp: i64,
    ) -> SinkResult<()> {
        if !value.is_finite() {
            return Err(SinkError::InvalidPoint(format!("{name}={value}")));
        }
        payload.push_str(&format!("{name} {value} {timestamp}\n"));
        Ok(())
    }
}

/// SQLite buffer with injectable append and purge failures.
pub(crate) struct FlakyBuffer {
    pub inner: ReadingBuffer,
    pub fail_append: Cell<bool>,
    pub fail_purge: Cell<bool>,
    pub purges: Cell<usize>,
}

impl FlakyBuffer {
    pub fn new() -> Self {
        Self {
            inner: ReadingBuffer::in_memory().unwrap(),
            fail_append: Cell::new(false),
            fail_purge: Cell::new(false),
            purges: Cell::new(0),
        }
    }
}

impl LocalBuffer for FlakyBuffer {
    fn append(&self, name: &str, value: f64, timestamp: i64) -> StoreResult<i64> {
        if self.fail_append.get() {
            return Err(StoreError::Io(io::Error::other("disk full")));
        }
        self.inner.append(name, value, timestamp)
    }

    fn scan(&self, limit: usize) -> StoreResult<Vec<LocalRecord>> {
        self.inner.scan(limit)
    }

    fn purge_up_to(&self, up_to: i64) -> StoreResult<usize> {
        if self.fail_purge.get() {
            return Err(StoreError::Io(io::Error::other("read-only filesystem")));
        }
        self.purges.set(self.purges.get() + 1);
        self.inner.purge_up_to(up_to)
    }

    fn pending_count(&self) -> StoreResult<u64> {
        self.inner.pending_count()
    }
}

pub(crate) fn always_buffer(flush_every: u64, page_size: usize) -> EngineConfig {
    EngineConfig {
        direct_write_when_idle: false,
        flush_every,
        page_size,
    }
}

pub(crate) fn engine(
    remote: RecordingRemote,
    config: EngineConfig,
) -> BufferedSyncEngine<FlakyBuffer, RecordingRemote> {
    BufferedSyncEngine::new(FlakyBuffer::new(), remote, config)
}

pub(crate) fn pending(engine: &BufferedSyncEngine<FlakyBuffer, RecordingRemote>) -> u64 {
    engine.pending_count().unwrap()
}
