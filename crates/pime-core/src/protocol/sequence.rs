//! Per-client sequence numbers for request/reply correlation.
//!
//! # Why sequence numbers? (for beginners)
//!
//! All clients on the machine share one output lane.  The identity tag on
//! each line tells a client which replies are *its own*, but not which of its
//! own requests a reply answers.  If a reply for an earlier, timed-out
//! request is still sitting in the lane, the client could mistake it for the
//! answer to a newer request.
//!
//! Every request therefore carries `seqNum`, and the server echoes it back.
//! The client accepts a reply only when the echoed number equals the one it
//! just sent.
//!
//! The counter is an `AtomicU64` so that `next()` can be called through a
//! shared reference; the client itself is single-threaded.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing counter, starting at 0, owned by one client.
///
/// # Examples
///
/// ```rust
/// use pime_core::protocol::SequenceCounter;
///
/// let counter = SequenceCounter::new();
/// assert_eq!(counter.next(), 0);
/// assert_eq!(counter.next(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SequenceCounter {
    inner: AtomicU64,
}

impl SequenceCounter {
    /// Creates a new counter starting at 0.
    pub fn new() -> Self {
        Self {
            inner: AtomicU64::new(0),
        }
    }

    /// Returns the next sequence number and advances the counter.
    ///
    /// Wraps from `u64::MAX` to 0 without panicking.
    pub fn next(&self) -> u64 {
        self.inner.fetch_add(1, Ordering::Relaxed)
    }
}
