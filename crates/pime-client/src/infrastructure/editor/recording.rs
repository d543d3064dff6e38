//! In-memory editor used by tests and the `pime-client` binary.
//!
//! # Why a recording editor?
//!
//! The real editor context lives inside the host's text services framework
//! and needs a running application with focus.  `RecordingEditor` keeps
//! every piece of editor state as plain public fields so that tests, and the
//! binary's demo mode, can see exactly what a batch of directives did.
//!
//! Ending a composition moves the composition text into `committed`, the
//! way the host inserts it into the document.  `start_calls` and `end_calls`
//! count every call, including redundant ones, so tests can check that the
//! reconciler never closes a composition it did not open.

use std::collections::BTreeMap;

use pime_core::domain::buttons::LangBarButton;
use pime_core::protocol::ButtonDescriptor;
use pime_core::CompositionState;
use uuid::Uuid;

use crate::application::editor::{EditorContext, HostCapabilities};

/// An editor that keeps all state in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingEditor {
    pub state: CompositionState,
    pub composition: String,
    /// Composition cursor in UTF-16 code units.
    pub cursor: usize,
    /// Text inserted into the document so far.
    pub committed: String,
    pub selection_keys: String,
    pub candidates: Vec<String>,
    pub candidates_showing: bool,
    pub candidate_cursor: Option<usize>,
    pub message: Option<(String, u32)>,
    pub anchor_refreshes: usize,
    pub buttons: BTreeMap<String, ButtonDescriptor>,
    /// Preserved keys by GUID: `(key_code, modifiers)`.
    pub preserved_keys: BTreeMap<Uuid, (u32, u32)>,
    pub keyboard_open: bool,
    pub font_name: Option<String>,
    pub font_size: Option<i32>,
    pub candidates_per_row: Option<i32>,
    pub candidate_use_cursor: Option<bool>,
    pub host: HostCapabilities,
    pub start_calls: usize,
    pub end_calls: usize,
}

impl RecordingEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an editor reporting the given host capabilities.
    pub fn with_capabilities(host: HostCapabilities) -> Self {
        Self {
            host,
            ..Self::default()
        }
    }
}

impl EditorContext for RecordingEditor {
    fn composition_state(&self) -> CompositionState {
        self.state
    }

    fn start_composition(&mut self) {
        self.start_calls += 1;
        self.state = CompositionState::Composing;
    }

    fn end_composition(&mut self) {
        self.end_calls += 1;
        if self.state.is_composing() {
            self.committed.push_str(&self.composition);
        }
        self.composition.clear();
        self.cursor = 0;
        self.state = CompositionState::NotComposing;
    }

    fn composition_string(&self) -> String {
        self.composition.clone()
    }

    fn set_composition_string(&mut self, text: &str) {
        self.composition = text.to_string();
    }

    fn set_composition_cursor(&mut self, position: usize) {
        self.cursor = position;
    }

    fn set_selection_keys(&mut self, keys: &str) {
        self.selection_keys = keys.to_string();
    }

    fn is_showing_candidates(&self) -> bool {
        self.candidates_showing
    }

    fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    fn show_candidates(&mut self) {
        self.candidates_showing = true;
    }

    fn hide_candidates(&mut self) {
        self.candidates_showing = false;
        self.candidate_cursor = None;
    }

    fn set_candidates(&mut self, candidates: &[String]) {
        self.candidates = candidates.to_vec();
    }

    fn set_candidate_cursor(&mut self, index: usize) {
        self.candidate_cursor = Some(index);
    }

    fn show_message(&mut self, text: &str, duration: u32) {
        self.message = Some((text.to_string(), duration));
    }

    fn hide_message(&mut self) {
        self.message = None;
    }

    fn refresh_window_anchors(&mut self) {
        self.anchor_refreshes += 1;
    }

    fn add_button(&mut self, button: &LangBarButton) {
        self.buttons
            .insert(button.id().to_string(), button.descriptor().clone());
    }

    fn update_button(&mut self, button: &LangBarButton) {
        if let Some(slot) = self.buttons.get_mut(button.id()) {
            *slot = button.descriptor().clone();
        }
    }

    fn remove_button(&mut self, button: &LangBarButton) {
        self.buttons.remove(button.id());
    }

    fn add_preserved_key(&mut self, key_code: u32, modifiers: u32, guid: Uuid) {
        self.preserved_keys.insert(guid, (key_code, modifiers));
    }

    fn remove_preserved_key(&mut self, guid: Uuid) {
        self.preserved_keys.remove(&guid);
    }

    fn is_keyboard_open(&self) -> bool {
        self.keyboard_open
    }

    fn set_keyboard_open(&mut self, open: bool) {
        self.keyboard_open = open;
    }

    fn set_candidate_font_name(&mut self, name: &str) {
        self.font_name = Some(name.to_string());
    }

    fn set_candidate_font_size(&mut self, size: i32) {
        self.font_size = Some(size);
    }

    fn set_candidates_per_row(&mut self, per_row: i32) {
        self.candidates_per_row = Some(per_row);
    }

    fn set_candidate_use_cursor(&mut self, use_cursor: bool) {
        self.candidate_use_cursor = Some(use_cursor);
    }

    fn capabilities(&self) -> HostCapabilities {
        self.host
    }
}
