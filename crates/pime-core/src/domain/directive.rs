//! State-update directives decoded from a server reply.

use crate::protocol::messages::{ButtonDescriptor, PreservedKeyDescriptor, UiCustomization};

/// One instruction from the server.
///
/// A reply is turned into an ordered batch of these by
/// [`Response::directives`](crate::protocol::Response::directives).  The
/// order of variants below is the order they are applied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Keys used to pick a candidate, one character per candidate slot.
    SetSelectionKeys(String),
    ShowMessage { text: String, duration: u32 },
    ShowCandidates(bool),
    CandidateList(Vec<String>),
    /// Highlighted candidate index.
    CandidateCursor(i64),
    /// Text to insert into the document, closing the composition.
    CommitString(String),
    CompositionString(String),
    /// Cursor position as a codepoint index into the composition string.
    CompositionCursor(i64),
    AddButton(ButtonDescriptor),
    RemoveButton(String),
    ChangeButton(ButtonDescriptor),
    AddPreservedKey(PreservedKeyDescriptor),
    /// GUID string of the preserved key to drop.
    RemovePreservedKey(String),
    KeyboardOpen(bool),
    CustomizeUi(UiCustomization),
    HideMessage,
}

impl Directive {
    /// Whether applying this directive needs an edit session on the host.
    pub fn needs_edit_session(&self) -> bool {
        matches!(
            self,
            Directive::ShowMessage { .. }
                | Directive::ShowCandidates(_)
                | Directive::CandidateList(_)
                | Directive::CandidateCursor(_)
                | Directive::CommitString(_)
                | Directive::CompositionString(_)
                | Directive::CompositionCursor(_)
        )
    }
}
