//! Shared record store backends and the locked lane operations on top of them.
//!
//! - **`store`** – The [`SharedRecordStore`] seam and the [`Lane`] selector.
//! - **`memory`** – Process-local store; used by tests and the loopback demo.
//! - **`file`** – Directory-backed store shared between processes.
//! - **`channel`** – [`QueueChannel`], the [`QueueTransport`](crate::application::request_response::QueueTransport)
//!   implementation with the RAII [`StoreLock`].
//! - **`loopback`** – An in-process server for development and tests.

pub mod channel;
pub mod file;
pub mod loopback;
pub mod memory;
pub mod store;

pub use channel::{QueueChannel, StoreLock};
pub use file::FileRecordStore;
pub use loopback::{EchoComposer, LoopbackServer};
pub use memory::InMemoryRecordStore;
pub use store::{Lane, SharedRecordStore, StoreError};
