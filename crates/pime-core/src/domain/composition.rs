//! Composition state and cursor conversion.
//!
//! # Why convert the cursor? (for beginners)
//!
//! The server counts the composition cursor in *characters* (Unicode
//! codepoints): in `"a😀b"` the position after the emoji is 2.  The host
//! editor counts in UTF-16 code units, where a character outside the Basic
//! Multilingual Plane such as `😀` is stored as a surrogate pair and takes two
//! units.  Handing the server's 2 to the editor would put the cursor in the
//! middle of the emoji.  [`utf16_cursor`] walks the string and counts two
//! units for every character that starts with a high surrogate.

/// Whether the editor currently has an open composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    NotComposing,
    Composing,
}

impl CompositionState {
    pub fn is_composing(self) -> bool {
        self == CompositionState::Composing
    }
}

/// Converts a codepoint cursor into a UTF-16 code unit cursor for `text`.
///
/// A cursor past the end of `text` is clamped to the end.
///
/// # Examples
///
/// ```rust
/// use pime_core::utf16_cursor;
///
/// assert_eq!(utf16_cursor("a😀b", 2), 3);
/// assert_eq!(utf16_cursor("abc", 2), 2);
/// ```
pub fn utf16_cursor(text: &str, cursor: usize) -> usize {
    text.chars().take(cursor).map(char::len_utf16).sum()
}
