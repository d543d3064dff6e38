//! QueueChannel: locked read-modify-write operations on the shared lanes.
//!
//! Every operation takes the store lock, reads the whole lane, edits it with
//! the pure functions from `pime_core::protocol::record`, writes it back,
//! and releases the lock.  Release is tied to [`StoreLock`]'s `Drop`, so it
//! happens on every exit path including `?` returns.

use pime_core::protocol::{append_record, extract_record, take_all_records};
use pime_core::QueueRecord;
use tracing::{debug, warn};

use crate::application::request_response::{QueueTransport, TransportError};
use crate::application::retry::RetryPolicy;

use super::store::{Lane, SharedRecordStore, StoreError};

impl From<StoreError> for TransportError {
    fn from(e: StoreError) -> Self {
        TransportError::Store(e.to_string())
    }
}

/// Exclusive ownership of a store, released on drop.
pub struct StoreLock<'a, S: SharedRecordStore> {
    store: &'a S,
}

impl<S: SharedRecordStore> StoreLock<'_, S> {
    pub fn read(&self, lane: Lane) -> Result<String, StoreError> {
        self.store.read_lane(lane)
    }

    pub fn write(&self, lane: Lane, content: &str) -> Result<(), StoreError> {
        self.store.write_lane(lane, content)
    }
}

impl<S: SharedRecordStore> Drop for StoreLock<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.store.close() {
            warn!("failed to release shared store: {e}");
        }
    }
}

/// Lane operations over a [`SharedRecordStore`] with a bounded lock wait.
pub struct QueueChannel<S> {
    store: S,
    lock_policy: RetryPolicy,
}

impl<S: SharedRecordStore> QueueChannel<S> {
    pub fn new(store: S, lock_policy: RetryPolicy) -> Self {
        Self { store, lock_policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Takes the store lock, retrying under the lock policy.
    ///
    /// # Errors
    ///
    /// [`TransportError::LockTimeout`] when every attempt found the store
    /// held, or [`TransportError::Store`] when the last attempt failed with
    /// a backend error.
    pub fn acquire_exclusive(&self) -> Result<StoreLock<'_, S>, TransportError> {
        let mut last_error = None;
        let acquired = self.lock_policy.retry(|| match self.store.try_open() {
            Ok(true) => {
                last_error = None;
                Some(())
            }
            Ok(false) => {
                last_error = None;
                None
            }
            Err(e) => {
                last_error = Some(e);
                None
            }
        });

        match (acquired, last_error) {
            (Some(()), _) => Ok(StoreLock { store: &self.store }),
            (None, Some(e)) => Err(e.into()),
            (None, None) => {
                warn!(attempts = self.lock_policy.max_attempts, "shared store lock timed out");
                Err(TransportError::LockTimeout {
                    attempts: self.lock_policy.max_attempts,
                })
            }
        }
    }

    /// Removes every complete record from the input lane.
    ///
    /// A trailing unterminated fragment stays in the lane.
    pub fn drain_input(&self) -> Result<Vec<QueueRecord>, TransportError> {
        let lock = self.acquire_exclusive()?;
        let lane = lock.read(Lane::Input)?;
        let (records, leftover) = take_all_records(&lane);
        if leftover.len() != lane.len() {
            lock.write(Lane::Input, &leftover)?;
        }
        Ok(records)
    }

    /// Appends `records` to the output lane in one locked pass.
    pub fn append_output(&self, records: &[QueueRecord]) -> Result<(), TransportError> {
        if records.is_empty() {
            return Ok(());
        }
        let lock = self.acquire_exclusive()?;
        let mut lane = lock.read(Lane::Output)?;
        for record in records {
            lane = append_record(&lane, record);
        }
        lock.write(Lane::Output, &lane)?;
        Ok(())
    }
}

impl<S: SharedRecordStore> QueueTransport for QueueChannel<S> {
    fn append_input(&self, record: &QueueRecord) -> Result<(), TransportError> {
        let lock = self.acquire_exclusive()?;
        let lane = lock.read(Lane::Input)?;
        lock.write(Lane::Input, &append_record(&lane, record))?;
        debug!(identity = %record.identity, bytes = record.payload.len(), "appended input record");
        Ok(())
    }

    fn scan_and_extract_output(&self, identity: &str) -> Result<String, TransportError> {
        let lock = self.acquire_exclusive()?;
        let lane = lock.read(Lane::Output)?;
        let (payload, remaining) = extract_record(&lane, identity).ok_or(TransportError::NotFound)?;
        lock.write(Lane::Output, &remaining)?;
        debug!(identity, bytes = payload.len(), "extracted output record");
        Ok(payload)
    }
}
