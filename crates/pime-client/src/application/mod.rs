//! Application layer use cases for the client.
//!
//! # What use cases does the client have?
//!
//! - **`request_response`** – Sends one sequence-numbered request through a
//!   [`QueueTransport`](request_response::QueueTransport) and waits for the
//!   matching reply.
//!
//! - **`reconcile_status`** – Applies a reply's directives to an
//!   [`EditorContext`](editor::EditorContext) in a fixed order and owns the
//!   language bar button registry.
//!
//! - **`dispatch_event`** – One thin wrapper per host event that builds the
//!   request, calls the server, and reconciles the reply.
//!
//! - **`registry`** – Owns one dispatcher per language profile.
//!
//! The traits at the seams (`QueueTransport`, `EditorContext`) are
//! implemented in the infrastructure layer.

pub mod dispatch_event;
pub mod editor;
pub mod reconcile_status;
pub mod registry;
pub mod request_response;
pub mod retry;
