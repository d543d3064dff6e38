//! Infrastructure layer for the client.
//!
//! Contains the adapters behind the application-layer seams: the shared
//! record store backends, an in-memory editor, the native menu renderers, and
//! configuration persistence.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `pime_core`, but MUST NOT be imported by the `application` layer outside
//! of tests.
//!
//! # Sub-modules
//!
//! - **`queue`** – `SharedRecordStore` backends (in-memory, file-backed),
//!   `QueueChannel` (the `QueueTransport` implementation), and the loopback
//!   server used for development.
//!
//! - **`editor`** – `RecordingEditor`, an `EditorContext` that keeps all state
//!   in plain fields.
//!
//! - **`menu`** – Language bar and popup menu renderers.
//!
//! - **`storage`** – TOML configuration file.

pub mod editor;
pub mod menu;
pub mod queue;
pub mod storage;
