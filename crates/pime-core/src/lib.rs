//! # pime-core
//!
//! Shared library for the PIME client bridge containing the queue protocol
//! (request/response schema, JSON codec, queue record lines), the directive
//! model that a server reply is decoded into, and the pure helpers the
//! status reconciler relies on.
//!
//! It has zero dependencies on OS APIs, shared stores, or editor sessions.
//!
//! # Architecture overview (for beginners)
//!
//! PIME splits an input method in two.  The *client* lives inside every
//! application that receives keyboard input; it knows nothing about how keys
//! become text.  The *server* is a separate process that owns all of the
//! language logic.  The two talk through a shared text blob made of two
//! "lanes": the client appends requests to the input lane and picks its
//! replies out of the output lane.
//!
//! This crate (`pime-core`) is the shared foundation.  It defines:
//!
//! - **`protocol`** – How requests and replies look on the wire.  Every
//!   message is a single line of compact JSON, tagged with the client's
//!   identity and carrying a sequence number for correlation.
//!
//! - **`domain`** – Pure logic with no I/O: the ordered directive batch, the
//!   composition state, the UTF-16 cursor fix-up, the language bar button
//!   registry, and the menu tree consumed by the menu renderers.

pub mod domain;
pub mod protocol;

pub use domain::composition::{utf16_cursor, CompositionState};
pub use domain::directive::Directive;
pub use protocol::codec::{decode_request, decode_response, encode_request, encode_response, ProtocolError};
pub use protocol::identity::ClientIdentity;
pub use protocol::messages::{Request, RequestBody, Response};
pub use protocol::record::QueueRecord;
