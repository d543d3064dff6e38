//! Editor adapters.
//!
//! The production editor wraps the host's text services framework and is
//! built alongside the host integration.  This crate ships the in-memory
//! [`RecordingEditor`], used by the tests and the `pime-client` binary.

pub mod recording;

pub use recording::RecordingEditor;
