use super::*;
use crate::{FlushReport, RecordOutcome};

#[test]
fn idle_engine_writes_first_reading_directly() {
    let mut engine = engine(RecordingRemote::ready(), EngineConfig::default());

    let outcome = engine.record("kitchen", 21.5, 1000);

    assert_eq!(outcome, RecordOutcome::DirectWritten);
    let remote = engine.remote();
    assert_eq!(remote.direct_calls.get(), 1);
    assert_eq!(
        remote.delivered.borrow().as_slice(),
        &["kitchen 21.5 1000\n".to_string()]
    );
    assert_eq!(remote.probes.get(), 0);
    assert_eq!(pending(&engine), 0);
    assert_eq!(engine.sync_counter(), 0);
}

#[test]
fn failed_direct_write_drops_reading_without_touching_buffer() {
    let remote = RecordingRemote::default();
    remote.direct_fails.set(true);
    let mut engine = engine(remote, EngineConfig::default());

    assert_eq!(
        engine.record("kitchen", 21.5, 1000),
        RecordOutcome::DirectDropped
    );
    assert_eq!(pending(&engine), 0);
    assert_eq!(engine.sync_counter(), 0);
    assert_eq!(engine.remote().delivered_count(), 0);
}

#[test]
fn idle_engine_stays_on_direct_path() {
    let mut engine = engine(RecordingRemote::ready(), EngineConfig::default());

    for ts in 0..15 {
        assert_eq!(
            engine.record("kitchen", 20.0, ts),
            RecordOutcome::DirectWritten
        );
    }

    assert_eq!(engine.remote().direct_calls.get(), 15);
    assert_eq!(engine.remote().probes.get(), 0);
    assert_eq!(pending(&engine), 0);
}

#[test]
fn failing_remote_buffers_everything_after_first_buffered_insert() {
    let remote = RecordingRemote::ready();
    remote.direct_fails.set(true);
    remote.batches_before_failure.set(Some(0));
    let mut engine = engine(remote, EngineConfig::default()).with_sync_counter(1);

    for ts in 0..25 {
        let outcome = engine.record("kitchen", 18.0 + ts as f64, ts);
        assert!(matches!(outcome, RecordOutcome::Buffered { .. }), "{outcome:?}");
    }

    assert_eq!(pending(&engine), 25);
    assert_eq!(engine.remote().probes.get(), 2);
    assert_eq!(engine.remote().direct_calls.get(), 0);
    assert_eq!(engine.local().purges.get(), 0);
    assert_eq!(engine.remote().delivered_count(), 0);
    assert_eq!(engine.sync_counter(), 26);
}

#[test]
fn buffer_drains_once_sink_recovers() {
    let mut engine = engine(RecordingRemote::default(), always_buffer(10, 3));

    for ts in 1..=10 {
        engine.record("kitchen", ts as f64, ts);
    }
    assert_eq!(engine.remote().probes.get(), 1);
    assert_eq!(pending(&engine), 10);

    engine.remote().ready.set(true);
    let mut last = None;
    for ts in 11..=20 {
        last = Some(engine.record("kitchen", ts as f64, ts));
    }

    let ids: Vec<i64> = (1..=20).collect();
    assert_eq!(
        last,
        Some(RecordOutcome::Buffered {
            flush: Some(FlushReport {
                batches: 7,
                records: 20,
                skipped: 0,
                last_purged_id: ids.last().copied(),
            })
        })
    );
    assert_eq!(pending(&engine), 0);
    assert_eq!(engine.sync_counter(), 0);
    assert_eq!(engine.remote().probes.get(), 2);
    assert_eq!(engine.remote().batch_calls.get(), 7);

    let delivered = engine.remote().delivered.borrow();
    let expected: Vec<String> = (1..=20).map(|ts| format!("kitchen {ts} {ts}\n")).collect();
    assert_eq!(*delivered, expected);
}

#[test]
fn unready_sink_never_receives_batches() {
    let mut engine = engine(RecordingRemote::default(), always_buffer(10, 200));

    for ts in 0..1000 {
        engine.record("kitchen", 19.5, ts);
    }

    assert_eq!(pending(&engine), 1000);
    assert_eq!(engine.remote().probes.get(), 100);
    assert_eq!(engine.remote().batch_calls.get(), 0);
    assert_eq!(engine.local().purges.get(), 0);
}

#[test]
fn drained_engine_returns_to_direct_path() {
    let config = EngineConfig {
        flush_every: 2,
        ..EngineConfig::default()
    };
    let mut engine = engine(RecordingRemote::ready(), config).with_sync_counter(1);

    assert!(matches!(
        engine.record("kitchen", 1.0, 1),
        RecordOutcome::Buffered { flush: Some(_) }
    ));
    assert_eq!(engine.sync_counter(), 0);

    assert_eq!(
        engine.record("kitchen", 2.0, 2),
        RecordOutcome::DirectWritten
    );
    assert_eq!(engine.remote().delivered_count(), 2);
}

#[test]
fn buffered_records_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("w1_therm.db");

    {
        let buffer = ReadingBuffer::open(&path).unwrap();
        let mut engine =
            BufferedSyncEngine::new(buffer, RecordingRemote::default(), always_buffer(10, 200));
        for ts in 0..5 {
            engine.record("kitchen", 20.0, ts);
        }
    }

    let buffer = ReadingBuffer::open(&path).unwrap();
    let mut engine =
        BufferedSyncEngine::new(buffer, RecordingRemote::ready(), always_buffer(10, 200));
    assert_eq!(engine.pending_count().unwrap(), 5);

    let report = engine.flush().unwrap();
    assert_eq!(report.records, 5);
    assert_eq!(report.batches, 1);
    assert_eq!(engine.pending_count().unwrap(), 0);
    assert_eq!(engine.remote().delivered_count(), 5);
}

#[test]
fn reading_recorder_routes_through_engine() {
    use therm_config_and_utils::{Reading, ReadingRecorder};

    let mut engine = engine(RecordingRemote::ready(), EngineConfig::default());
    ReadingRecorder::record(&mut engine, &Reading::new("attic", -4.5, 42));

    assert_eq!(
        engine.remote().delivered.borrow().as_slice(),
        &["attic -4.5 42\n".to_string()]
    );
}
