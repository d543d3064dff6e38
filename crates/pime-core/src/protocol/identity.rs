//! Client identity and GUID string helpers.
//!
//! Two kinds of GUID strings cross the wire:
//!
//! - The **client identity** tags every queue record.  It is a lowercase,
//!   hyphenated UUID *without* braces, e.g.
//!   `9f1c2d3e-0000-4000-8000-00000000abcd`.
//! - **Profile and preserved-key GUIDs** travel in request/response fields in
//!   the registry form the input framework prints, with braces, e.g.
//!   `{9f1c2d3e-0000-4000-8000-00000000abcd}`.

use std::fmt;

use uuid::Uuid;

/// Identity tag of one client instance, generated once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientIdentity(Uuid);

impl ClientIdentity {
    /// Creates a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID (used by tests and the loopback server).
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the tag exactly as written at the start of a queue line.
    pub fn tag(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // uuid's hyphenated form is already lowercase.
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Parses a GUID string as sent by the server.
///
/// Accepts the braced registry form as well as the bare hyphenated form.
/// Returns `None` for anything else; callers skip the entry.
pub fn parse_guid(text: &str) -> Option<Uuid> {
    Uuid::parse_str(text.trim()).ok()
}

/// Formats a GUID in the lowercase braced form used in request fields.
pub fn format_guid(guid: &Uuid) -> String {
    guid.braced().to_string()
}
