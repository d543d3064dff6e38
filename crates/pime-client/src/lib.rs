//! pime-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does pime-client do? (for beginners)
//!
//! The *client* is the half of the input method that runs inside every
//! application receiving keyboard input.  It never decides what a key means;
//! it asks the server.  For every host event it:
//!
//! 1. Builds a request (`onKeyDown`, `onActivate`, ...) tagged with a
//!    sequence number.
//! 2. Appends it, tagged with the client's identity, to the input lane of the
//!    shared record store, under an exclusive lock.
//! 3. Polls the output lane until a line with its identity appears, removes
//!    that line, and checks the sequence number.
//! 4. Applies the reply's directives (composition text, candidates, buttons,
//!    preserved keys, ...) to the host editor in a fixed order.
//!
//! Every failure along the way degrades to "no reply": keys are reported as
//! not consumed and the editor is left alone.

/// Application layer: use cases for the client.
pub mod application;

/// Infrastructure layer: shared-store adapters, editor, menu renderers, config.
pub mod infrastructure;
