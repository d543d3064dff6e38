//! Process-local record store.
//!
//! Clones share the same lanes and lock, so one handle can be given to a
//! client and another to the loopback server thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::store::{Lane, SharedRecordStore, StoreError};

#[derive(Debug, Default)]
struct Lanes {
    held: bool,
    input: String,
    output: String,
}

impl Lanes {
    fn lane_mut(&mut self, lane: Lane) -> &mut String {
        match lane {
            Lane::Input => &mut self.input,
            Lane::Output => &mut self.output,
        }
    }
}

/// A cloneable handle on an in-memory store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    inner: Arc<Mutex<Lanes>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a lane without taking the store lock.
    pub fn lane_snapshot(&self, lane: Lane) -> String {
        self.lanes().lane_mut(lane).clone()
    }

    /// Overwrites a lane without taking the store lock.
    pub fn seed_lane(&self, lane: Lane, content: &str) {
        *self.lanes().lane_mut(lane) = content.to_string();
    }

    /// Whether some holder currently has the store open.
    pub fn is_held(&self) -> bool {
        self.lanes().held
    }

    fn lanes(&self) -> MutexGuard<'_, Lanes> {
        // A panic while holding the mutex leaves plain strings behind; keep going.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SharedRecordStore for InMemoryRecordStore {
    fn try_open(&self) -> Result<bool, StoreError> {
        let mut lanes = self.lanes();
        if lanes.held {
            return Ok(false);
        }
        lanes.held = true;
        Ok(true)
    }

    fn close(&self) -> Result<(), StoreError> {
        self.lanes().held = false;
        Ok(())
    }

    fn read_lane(&self, lane: Lane) -> Result<String, StoreError> {
        let mut lanes = self.lanes();
        if !lanes.held {
            return Err(StoreError::NotOpen);
        }
        Ok(lanes.lane_mut(lane).clone())
    }

    fn write_lane(&self, lane: Lane, content: &str) -> Result<(), StoreError> {
        let mut lanes = self.lanes();
        if !lanes.held {
            return Err(StoreError::NotOpen);
        }
        *lanes.lane_mut(lane) = content.to_string();
        Ok(())
    }
}
