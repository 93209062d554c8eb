//! SQLite-backed reading buffer.

use crate::{migrations, StoreError, StoreResult};
use rusqlite::{params, Connection};
use std::path::Path;
use therm_config_and_utils::MAX_SENSOR_NAME_LEN;
use tracing::debug;

/// Longest sensor name accepted, in bytes.
pub const MAX_NAME_LEN: usize = MAX_SENSOR_NAME_LEN;

/// A buffered reading as stored locally.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecord {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub timestamp: i64,
}

/// Durable buffer of readings keyed by a monotonically increasing id.
pub struct ReadingBuffer {
    conn: Connection,
}

impl ReadingBuffer {
    /// Open a buffer at the given path, creating the file and schema if needed.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // FULL sync: an acknowledged append must survive power loss.
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = FULL;
            PRAGMA busy_timeout = 5000;
        ",
        )?;

        migrations::run_migrations(&conn)?;

        debug!(path = %path.display(), "Reading buffer opened");
        Ok(Self { conn })
    }

    /// Open an in-memory buffer for testing.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Persist a reading and return its id.
    ///
    /// NaN and infinities are rejected with [`StoreError::InvalidValue`]: SQLite turns a
    /// bound NaN into NULL and the remote sink cannot accept either.
    pub fn append(&self, name: &str, value: f64, timestamp: i64) -> StoreResult<i64> {
        validate_name(name)?;
        if !value.is_finite() {
            return Err(StoreError::InvalidValue(value));
        }

        self.conn.execute(
            "INSERT INTO readings (name, value, timestamp) VALUES (?1, ?2, ?3)",
            params![name, value, timestamp],
        )?;
        let id = self.conn.last_insert_rowid();

        debug!(id, name, value, timestamp, "Buffered reading");
        Ok(id)
    }

    /// Up to `limit` records in ascending id order.
    pub fn scan(&self, limit: usize) -> StoreResult<Vec<LocalRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, name, value, timestamp FROM readings ORDER BY id ASC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit], |row| {
                Ok(LocalRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    value: row.get(2)?,
                    timestamp: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Delete every record with `id <= up_to`. Returns the number of rows removed.
    ///
    /// Callers must only pass ids that were confirmed delivered; the store does not check.
    pub fn purge_up_to(&self, up_to: i64) -> StoreResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM readings WHERE id <= ?1", params![up_to])?;

        debug!(up_to, removed, "Purged buffered readings");
        Ok(removed)
    }

    /// Number of records currently buffered.
    pub fn pending_count(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidName("name is empty".to_string()));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::InvalidName(format!(
            "name is {} bytes, limit is {MAX_NAME_LEN}",
            name.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_scan_returns_records_oldest_first() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        buffer.append("kitchen", 21.5, 1000).unwrap();
        buffer.append("kitchen", 21.75, 1300).unwrap();
        buffer.append("kitchen", -3.125, 1600).unwrap();

        let records = buffer.scan(10).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(records[0].value, 21.5);
        assert_eq!(records[2].value, -3.125);
        assert_eq!(records[2].timestamp, 1600);
    }

    #[test]
    fn scan_respects_limit() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        for i in 0..5 {
            buffer.append("s", i as f64, i).unwrap();
        }

        let page = buffer.scan(2).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].timestamp, 0);
        assert_eq!(page[1].timestamp, 1);
    }

    #[test]
    fn scan_empty_and_zero_limit() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        assert!(buffer.scan(200).unwrap().is_empty());

        buffer.append("s", 1.0, 1).unwrap();
        assert!(buffer.scan(0).unwrap().is_empty());
    }

    #[test]
    fn purge_up_to_removes_only_lower_ids() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        let ids: Vec<i64> = (0..4)
            .map(|i| buffer.append("s", i as f64, i).unwrap())
            .collect();

        let removed = buffer.purge_up_to(ids[1]).unwrap();
        assert_eq!(removed, 2);

        let remaining: Vec<i64> = buffer.scan(10).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(remaining, vec![ids[2], ids[3]]);
    }

    #[test]
    fn purge_up_to_on_empty_store_is_noop() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        assert_eq!(buffer.purge_up_to(42).unwrap(), 0);
    }

    #[test]
    fn rejects_empty_and_oversized_names() {
        let buffer = ReadingBuffer::in_memory().unwrap();

        assert!(matches!(
            buffer.append("", 1.0, 1),
            Err(StoreError::InvalidName(_))
        ));
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(matches!(
            buffer.append(&long, 1.0, 1),
            Err(StoreError::InvalidName(_))
        ));
        let exact = "x".repeat(MAX_NAME_LEN);
        assert!(buffer.append(&exact, 1.0, 1).is_ok());
        assert_eq!(buffer.pending_count().unwrap(), 1);
    }

    #[test]
    fn values_pass_through_losslessly() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        let values = [0.1 + 0.2, f64::MIN_POSITIVE, 1e300, -0.0625, 23125.0];
        for (i, v) in values.iter().enumerate() {
            buffer.append("s", *v, i as i64).unwrap();
        }

        let stored: Vec<f64> = buffer.scan(10).unwrap().iter().map(|r| r.value).collect();
        assert_eq!(stored, values.to_vec());
    }

    #[test]
    fn rejects_non_finite_values() {
        let buffer = ReadingBuffer::in_memory().unwrap();

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                buffer.append("kitchen", value, 1),
                Err(StoreError::InvalidValue(_))
            ));
        }
        assert_eq!(buffer.pending_count().unwrap(), 0);

        let id = buffer.append("kitchen", f64::MAX, 2).unwrap();
        assert_eq!(buffer.scan(10).unwrap()[0].id, id);
    }

    #[test]
    fn pending_count_tracks_appends_and_purges() {
        let buffer = ReadingBuffer::in_memory().unwrap();
        assert_eq!(buffer.pending_count().unwrap(), 0);

        let id = buffer.append("s", 1.0, 1).unwrap();
        buffer.append("s", 2.0, 2).unwrap();
        assert_eq!(buffer.pending_count().unwrap(), 2);

        buffer.purge_up_to(id).unwrap();
        assert_eq!(buffer.pending_count().unwrap(), 1);
    }
}
