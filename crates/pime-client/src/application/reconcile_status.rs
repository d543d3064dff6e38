//! StatusReconciler: applies a reply's directives to the editor.
//!
//! # Why a fixed order? (for beginners)
//!
//! One reply can carry many directives at once, for example "commit this
//! text, then start a new composition with that text, then show these
//! candidates".  The editor only produces the right result if they are
//! applied in a particular order:
//!
//! 1. selection keys
//! 2. message (opens a composition to anchor the message window if needed)
//! 3. candidate visibility, list, and cursor
//! 4. commit string (always closes the composition)
//! 5. composition string
//! 6. composition cursor
//! 7. language bar buttons (add, remove, change)
//! 8. preserved keys (add, remove)
//! 9. keyboard open/closed
//! 10. UI customization
//! 11. hide message
//! 12. close any composition opened only to anchor a message, or emptied in step 5
//!
//! Steps 2-6 and 12 touch the document and are skipped when the host gave
//! no edit session for the event.

use pime_core::domain::buttons::{ButtonRegistry, LangBarButton};
use pime_core::protocol::{parse_guid, ButtonDescriptor, PreservedKeyDescriptor, UiCustomization};
use pime_core::{utf16_cursor, Directive, Response};
use tracing::{debug, warn};

use super::editor::{EditSession, EditorContext};

/// Applies directive batches and owns this client's language bar buttons.
#[derive(Debug, Default)]
pub struct StatusReconciler {
    buttons: ButtonRegistry,
}

/// The directives of one batch, grouped by step.
#[derive(Default)]
struct Batch {
    selection_keys: Option<String>,
    message: Option<(String, u32)>,
    show_candidates: Option<bool>,
    candidates: Option<Vec<String>>,
    candidate_cursor: Option<i64>,
    commit: Option<String>,
    composition: Option<String>,
    composition_cursor: Option<i64>,
    add_buttons: Vec<ButtonDescriptor>,
    remove_buttons: Vec<String>,
    change_buttons: Vec<ButtonDescriptor>,
    add_keys: Vec<PreservedKeyDescriptor>,
    remove_keys: Vec<String>,
    keyboard_open: Option<bool>,
    customize: Option<UiCustomization>,
    hide_message: bool,
}

impl Batch {
    fn collect(directives: &[Directive]) -> Self {
        let mut batch = Batch::default();
        for directive in directives {
            match directive {
                Directive::SetSelectionKeys(keys) => batch.selection_keys = Some(keys.clone()),
                Directive::ShowMessage { text, duration } => {
                    batch.message = Some((text.clone(), *duration))
                }
                Directive::ShowCandidates(show) => batch.show_candidates = Some(*show),
                Directive::CandidateList(list) => batch.candidates = Some(list.clone()),
                Directive::CandidateCursor(c) => batch.candidate_cursor = Some(*c),
                Directive::CommitString(text) => batch.commit = Some(text.clone()),
                Directive::CompositionString(text) => batch.composition = Some(text.clone()),
                Directive::CompositionCursor(c) => batch.composition_cursor = Some(*c),
                Directive::AddButton(d) => batch.add_buttons.push(d.clone()),
                Directive::RemoveButton(id) => batch.remove_buttons.push(id.clone()),
                Directive::ChangeButton(d) => batch.change_buttons.push(d.clone()),
                Directive::AddPreservedKey(k) => batch.add_keys.push(k.clone()),
                Directive::RemovePreservedKey(g) => batch.remove_keys.push(g.clone()),
                Directive::KeyboardOpen(open) => batch.keyboard_open = Some(*open),
                Directive::CustomizeUi(ui) => batch.customize = Some(ui.clone()),
                Directive::HideMessage => batch.hide_message = true,
            }
        }
        batch
    }
}

impl StatusReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buttons(&self) -> &ButtonRegistry {
        &self.buttons
    }

    /// Applies `response` if it reports success.  Returns whether it was applied.
    pub fn apply(
        &mut self,
        response: &Response,
        editor: &mut dyn EditorContext,
        session: EditSession,
    ) -> bool {
        if !response.success {
            debug!(seq = response.seq_num, "reply reports failure; not applied");
            return false;
        }
        self.apply_directives(&response.directives(), editor, session);
        true
    }

    /// Applies a directive batch in the fixed step order, whatever order
    /// `directives` is in.
    pub fn apply_directives(
        &mut self,
        directives: &[Directive],
        editor: &mut dyn EditorContext,
        session: EditSession,
    ) {
        let batch = Batch::collect(directives);
        let in_session = session == EditSession::Available;
        let mut pending_close = false;

        // 1
        if let Some(keys) = &batch.selection_keys {
            editor.set_selection_keys(keys);
        }

        if in_session {
            // 2
            if let Some((text, duration)) = &batch.message {
                if ensure_composing(editor) {
                    pending_close = true;
                }
                editor.show_message(text, *duration);
            }

            // 3
            apply_candidates(&batch, editor);

            // 4
            if let Some(text) = batch.commit.as_deref().filter(|t| !t.is_empty()) {
                ensure_composing(editor);
                editor.set_composition_string(text);
                editor.refresh_window_anchors();
                close_composition(editor);
            }

            // 5
            let mut empty_composition = false;
            if let Some(text) = &batch.composition {
                if text.is_empty() {
                    empty_composition = true;
                    if editor.composition_state().is_composing() && !editor.is_showing_candidates() {
                        editor.set_composition_string("");
                        pending_close = true;
                    }
                } else {
                    ensure_composing(editor);
                    editor.set_composition_string(text);
                }
                editor.refresh_window_anchors();
            }

            // 6
            if let Some(cursor) = batch.composition_cursor.filter(|_| !empty_composition) {
                apply_composition_cursor(cursor, batch.composition.as_deref(), editor);
            }
        } else if directives.iter().any(Directive::needs_edit_session) {
            debug!("no edit session; composition and candidate directives skipped");
        }

        // 7
        for descriptor in batch.add_buttons {
            self.add_button(descriptor, editor);
        }
        for id in &batch.remove_buttons {
            match self.buttons.remove(id) {
                Some(button) => editor.remove_button(&button),
                None => debug!(id = %id, "removeButton for unknown id ignored"),
            }
        }
        for update in &batch.change_buttons {
            match self.buttons.get_mut(&update.id) {
                Some(button) => {
                    button.apply_update(update);
                    editor.update_button(button);
                }
                None => debug!(id = %update.id, "changeButton for unknown id ignored"),
            }
        }

        // 8
        for key in &batch.add_keys {
            match parse_guid(&key.guid) {
                Some(guid) => editor.add_preserved_key(key.key_code, key.modifiers, guid),
                None => warn!(guid = %key.guid, "skipping addPreservedKey with invalid GUID"),
            }
        }
        for text in &batch.remove_keys {
            match parse_guid(text) {
                Some(guid) => editor.remove_preserved_key(guid),
                None => warn!(guid = %text, "skipping removePreservedKey with invalid GUID"),
            }
        }

        // 9
        if let Some(open) = batch.keyboard_open {
            editor.set_keyboard_open(open);
        }

        // 10
        if let Some(ui) = &batch.customize {
            if let Some(name) = &ui.cand_font_name {
                editor.set_candidate_font_name(name);
            }
            if let Some(size) = ui.cand_font_size {
                editor.set_candidate_font_size(size);
            }
            if let Some(per_row) = ui.cand_per_row {
                editor.set_candidates_per_row(per_row);
            }
            if let Some(use_cursor) = ui.cand_use_cursor {
                editor.set_candidate_use_cursor(use_cursor);
            }
        }

        // 11
        if batch.hide_message {
            editor.hide_message();
        }

        // 12
        if in_session && pending_close {
            close_composition(editor);
        }
    }

    /// Removes every registered button from the host and forgets them.
    pub fn teardown(&mut self, editor: &mut dyn EditorContext) {
        let buttons = self.buttons.drain();
        if !buttons.is_empty() {
            debug!(count = buttons.len(), "removing language bar buttons");
        }
        for button in &buttons {
            editor.remove_button(button);
        }
    }

    fn add_button(&mut self, descriptor: ButtonDescriptor, editor: &mut dyn EditorContext) {
        let Some(button) = LangBarButton::from_descriptor(descriptor) else {
            warn!("skipping addButton without an id");
            return;
        };
        if let Some(old) = self.buttons.insert(button.clone()) {
            debug!(id = %old.id(), "addButton replaces an existing button");
            editor.remove_button(&old);
        }
        editor.add_button(&button);
    }
}

// ── Composition helpers ───────────────────────────────────────────────────────

/// Starts a composition unless one is open.  Returns whether it started one.
fn ensure_composing(editor: &mut dyn EditorContext) -> bool {
    if editor.composition_state().is_composing() {
        return false;
    }
    editor.start_composition();
    true
}

/// Ends the composition if one is open.
fn close_composition(editor: &mut dyn EditorContext) {
    if editor.composition_state().is_composing() {
        editor.end_composition();
    }
}

fn apply_candidates(batch: &Batch, editor: &mut dyn EditorContext) {
    let show = batch.show_candidates == Some(true);
    if show {
        ensure_composing(editor);
        editor.show_candidates();
    } else if batch.show_candidates.is_some() {
        editor.hide_candidates();
    }

    // A new list stays hidden unless the same batch asked to show it.
    if let Some(list) = &batch.candidates {
        editor.set_candidates(list);
        if !show {
            editor.hide_candidates();
        }
    }

    if let Some(cursor) = batch.candidate_cursor {
        let in_range = usize::try_from(cursor)
            .ok()
            .filter(|&index| editor.is_showing_candidates() && index < editor.candidate_count());
        match in_range {
            Some(index) => editor.set_candidate_cursor(index),
            None => debug!(cursor, "candidate cursor ignored"),
        }
    }
}

fn apply_composition_cursor(cursor: i64, batch_text: Option<&str>, editor: &mut dyn EditorContext) {
    let Ok(index) = usize::try_from(cursor) else {
        debug!(cursor, "negative composition cursor ignored");
        return;
    };
    if !editor.composition_state().is_composing() {
        return;
    }
    let text = match batch_text {
        Some(text) => text.to_string(),
        None => editor.composition_string(),
    };
    editor.set_composition_cursor(utf16_cursor(&text, index));
}
