//! The shared record store seam.
//!
//! A store holds the two lanes as plain text blobs and offers a coarse,
//! non-blocking exclusive open.  Everything above it (retries, line
//! editing, correlation) is built in [`QueueChannel`](super::channel::QueueChannel).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which lane of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Client to server.
    Input,
    /// Server to client.
    Output,
}

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("lane accessed without holding the store lock")]
    NotOpen,
}

/// A text store shared by every client and the server.
///
/// `try_open` must be atomic across all contenders: at most one caller sees
/// `Ok(true)` until that caller calls `close`.
pub trait SharedRecordStore {
    /// Tries once to take exclusive ownership.  `Ok(false)` means another
    /// holder has it.
    fn try_open(&self) -> Result<bool, StoreError>;

    /// Releases ownership taken by `try_open`.
    fn close(&self) -> Result<(), StoreError>;

    /// Reads a whole lane.  An absent lane reads as empty.
    fn read_lane(&self, lane: Lane) -> Result<String, StoreError>;

    /// Replaces a whole lane.
    fn write_lane(&self, lane: Lane, content: &str) -> Result<(), StoreError>;
}
