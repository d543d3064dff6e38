//! The host editor seen from the client.
//!
//! [`EditorContext`] is everything the reconciler and dispatcher need from
//! the host text service: the composition, the candidate and message
//! windows, language bar buttons, preserved keys, keyboard state, and UI
//! settings.  The real implementation wraps the host's text services
//! framework objects; tests use the generated `MockEditorContext` or the
//! recording editor in the infrastructure layer.

use pime_core::domain::buttons::LangBarButton;
use pime_core::CompositionState;
use uuid::Uuid;

/// Static facts about the host reported once in the `init` handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Windows 8 or later.
    pub is_windows8_above: bool,
    /// Running inside a modern (immersive) app.
    pub is_metro_app: bool,
    /// The host draws its own candidate UI.
    pub is_ui_less: bool,
    /// Running inside a console window.
    pub is_console: bool,
}

/// Whether the host opened an edit session for the current event.
///
/// Composition, candidate, and message directives can only be applied
/// inside an edit session; the rest are applied either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSession {
    Available,
    Unavailable,
}

/// Operations the host editor exposes to the client.
#[cfg_attr(test, mockall::automock)]
pub trait EditorContext {
    // ── Composition ───────────────────────────────────────────────────────

    fn composition_state(&self) -> CompositionState;
    fn start_composition(&mut self);
    fn end_composition(&mut self);
    fn composition_string(&self) -> String;
    fn set_composition_string(&mut self, text: &str);
    /// Sets the cursor, in UTF-16 code units.
    fn set_composition_cursor(&mut self, position: usize);

    // ── Candidates and messages ───────────────────────────────────────────

    fn set_selection_keys(&mut self, keys: &str);
    fn is_showing_candidates(&self) -> bool;
    fn candidate_count(&self) -> usize;
    fn show_candidates(&mut self);
    fn hide_candidates(&mut self);
    fn set_candidates(&mut self, candidates: &[String]);
    fn set_candidate_cursor(&mut self, index: usize);
    fn show_message(&mut self, text: &str, duration: u32);
    fn hide_message(&mut self);
    /// Re-anchors the candidate and message windows after the composition moved.
    fn refresh_window_anchors(&mut self);

    // ── Language bar and keys ─────────────────────────────────────────────

    fn add_button(&mut self, button: &LangBarButton);
    fn update_button(&mut self, button: &LangBarButton);
    fn remove_button(&mut self, button: &LangBarButton);
    fn add_preserved_key(&mut self, key_code: u32, modifiers: u32, guid: Uuid);
    fn remove_preserved_key(&mut self, guid: Uuid);
    fn is_keyboard_open(&self) -> bool;
    fn set_keyboard_open(&mut self, open: bool);

    // ── UI customization ──────────────────────────────────────────────────

    fn set_candidate_font_name(&mut self, name: &str);
    fn set_candidate_font_size(&mut self, size: i32);
    fn set_candidates_per_row(&mut self, per_row: i32);
    fn set_candidate_use_cursor(&mut self, use_cursor: bool);

    fn capabilities(&self) -> HostCapabilities;
}
