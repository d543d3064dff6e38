//! Domain layer: pure logic shared by the client use cases.
//!
//! # Modules
//!
//! - **`directive`** – The [`Directive`](directive::Directive) enum: one
//!   state-update instruction decoded from a server reply.
//! - **`composition`** – The composition state machine states and the UTF-16
//!   cursor fix-up.
//! - **`buttons`** – The language bar [`ButtonRegistry`](buttons::ButtonRegistry).
//! - **`menu`** – The generic menu tree returned by `onMenu`, plus the
//!   [`MenuRenderer`](menu::MenuRenderer) strategy trait.

pub mod buttons;
pub mod composition;
pub mod directive;
pub mod menu;
