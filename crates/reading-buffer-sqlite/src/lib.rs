//! # reading-buffer-sqlite
//!
//! The local durable store for readings that have not reached the remote sink yet.
//!
//! - Every record gets an integer id strictly greater than any id handed out before,
//!   including ids from earlier runs and ids of records that were already purged.
//! - Records are read back oldest first and removed only by [`ReadingBuffer::purge_up_to`].
//! - The schema is created on first open; reopening an initialized file is a no-op.
//!
//! ```rust
//! use reading_buffer_sqlite::ReadingBuffer;
//!
//! let buffer = ReadingBuffer::in_memory().unwrap();
//! let first = buffer.append("kitchen", 21.5, 1_000).unwrap();
//! let second = buffer.append("kitchen", 21.6, 1_300).unwrap();
//! assert!(second > first);
//!
//! let page = buffer.scan(200).unwrap();
//! assert_eq!(page.len(), 2);
//!
//! buffer.purge_up_to(first).unwrap();
//! assert_eq!(buffer.pending_count().unwrap(), 1);
//! ```

mod buffer;
mod error;
mod migrations;

#[cfg(test)]
mod tests;

pub use buffer::{LocalRecord, ReadingBuffer, MAX_NAME_LEN};
pub use error::{StoreError, StoreResult};
pub use migrations::CURRENT_VERSION;
