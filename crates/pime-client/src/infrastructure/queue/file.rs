//! Directory-backed record store shared between processes.
//!
//! Layout:
//!
//! ```text
//! <dir>/input.queue    client -> server lane
//! <dir>/output.queue   server -> client lane
//! <dir>/queue.lock     present while someone holds the store
//! ```
//!
//! The lock file is created with `create_new`, which the OS performs as one
//! atomic "create if absent" step, so exactly one process can hold it.  It is
//! deleted on close.  A process that dies while holding the lock leaves the
//! file behind and every later open times out until it is removed by hand.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::store::{Lane, SharedRecordStore, StoreError};

const INPUT_FILE: &str = "input.queue";
const OUTPUT_FILE: &str = "output.queue";
const LOCK_FILE: &str = "queue.lock";

#[derive(Debug, Clone)]
pub struct FileRecordStore {
    dir: PathBuf,
}

impl FileRecordStore {
    /// Opens the store in `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn lane_path(&self, lane: Lane) -> PathBuf {
        self.dir.join(match lane {
            Lane::Input => INPUT_FILE,
            Lane::Output => OUTPUT_FILE,
        })
    }

    fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

impl SharedRecordStore for FileRecordStore {
    fn try_open(&self) -> Result<bool, StoreError> {
        let path = self.lock_path();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn close(&self) -> Result<(), StoreError> {
        let path = self.lock_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn read_lane(&self, lane: Lane) -> Result<String, StoreError> {
        let path = self.lane_path(lane);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_lane(&self, lane: Lane, content: &str) -> Result<(), StoreError> {
        let path = self.lane_path(lane);
        fs::write(&path, content).map_err(|source| StoreError::Io { path, source })
    }
}
