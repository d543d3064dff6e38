//! EventDispatcher: one wrapper per host event.
//!
//! Every wrapper builds the request for its event, performs the call, and
//! feeds a successful reply to the [`StatusReconciler`].  A failed call is
//! treated as an empty reply: key events report "not consumed" and the
//! editor is left untouched.
//!
//! Only `onKeyDown` and `onKeyUp` run inside an edit session on the host, so
//! only their replies may change the composition or candidates.

use pime_core::domain::menu::{parse_menu, MenuItem, MenuRenderer};
use pime_core::protocol::identity::format_guid;
use pime_core::protocol::{CommandType, KeyEvent};
use pime_core::{ClientIdentity, RequestBody, Response};
use tracing::{debug, info};
use uuid::Uuid;

use super::editor::{EditSession, EditorContext};
use super::reconcile_status::StatusReconciler;
use super::request_response::{QueueTransport, RequestResponseClient};

/// Host event handling for one language profile.
pub struct EventDispatcher<T> {
    client: RequestResponseClient<T>,
    reconciler: StatusReconciler,
    profile: Uuid,
    initialized: bool,
    activated: bool,
}

impl<T: QueueTransport> EventDispatcher<T> {
    pub fn new(client: RequestResponseClient<T>, profile: Uuid) -> Self {
        Self {
            client,
            reconciler: StatusReconciler::new(),
            profile,
            initialized: false,
            activated: false,
        }
    }

    pub fn identity(&self) -> &ClientIdentity {
        self.client.identity()
    }

    pub fn profile(&self) -> Uuid {
        self.profile
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn reconciler(&self) -> &StatusReconciler {
        &self.reconciler
    }

    // ── Activation ────────────────────────────────────────────────────────

    /// Activates the profile, sending the `init` handshake first if it has
    /// not succeeded yet.  A failed handshake does not block activation; it
    /// is attempted again on the next activation.  Returns whether the server
    /// acknowledged activation.
    pub fn on_activate(&mut self, editor: &mut dyn EditorContext) -> bool {
        if !self.initialized {
            self.init(editor);
        }
        let body = RequestBody::OnActivate {
            is_keyboard_open: editor.is_keyboard_open(),
        };
        let activated = self
            .send(body, editor, EditSession::Unavailable)
            .is_some_and(|r| r.success);
        if activated {
            info!(client = %self.identity(), profile = %format_guid(&self.profile), "activated");
        }
        self.activated = activated;
        activated
    }

    pub fn on_deactivate(&mut self, editor: &mut dyn EditorContext) {
        self.send(RequestBody::OnDeactivate, editor, EditSession::Unavailable);
        self.activated = false;
        debug!(client = %self.identity(), "deactivated");
    }

    fn init(&mut self, editor: &mut dyn EditorContext) -> bool {
        let host = editor.capabilities();
        let body = RequestBody::Init {
            id: format_guid(&self.profile),
            is_windows8_above: host.is_windows8_above,
            is_metro_app: host.is_metro_app,
            is_ui_less: host.is_ui_less,
            is_console: host.is_console,
        };
        self.initialized = self
            .send(body, editor, EditSession::Unavailable)
            .is_some_and(|r| r.success);
        if !self.initialized {
            debug!(client = %self.identity(), "init handshake failed; retrying on next activation");
        }
        self.initialized
    }

    // ── Keys ──────────────────────────────────────────────────────────────

    /// Asks whether the server wants the key-down.  Returns the "consumed" flag.
    pub fn filter_key_down(&mut self, editor: &mut dyn EditorContext, key: &KeyEvent) -> bool {
        self.send_key(RequestBody::FilterKeyDown(key.clone()), editor, EditSession::Unavailable)
    }

    pub fn on_key_down(&mut self, editor: &mut dyn EditorContext, key: &KeyEvent) -> bool {
        self.send_key(RequestBody::OnKeyDown(key.clone()), editor, EditSession::Available)
    }

    pub fn filter_key_up(&mut self, editor: &mut dyn EditorContext, key: &KeyEvent) -> bool {
        self.send_key(RequestBody::FilterKeyUp(key.clone()), editor, EditSession::Unavailable)
    }

    pub fn on_key_up(&mut self, editor: &mut dyn EditorContext, key: &KeyEvent) -> bool {
        self.send_key(RequestBody::OnKeyUp(key.clone()), editor, EditSession::Available)
    }

    pub fn on_preserved_key(&mut self, editor: &mut dyn EditorContext, guid: Uuid) -> bool {
        let body = RequestBody::OnPreservedKey {
            guid: format_guid(&guid),
        };
        self.send_key(body, editor, EditSession::Unavailable)
    }

    // ── Language bar ──────────────────────────────────────────────────────

    /// Reports a click on a language bar button or menu item.  Returns
    /// whether the server handled the command.
    pub fn on_command(&mut self, editor: &mut dyn EditorContext, id: u32, kind: CommandType) -> bool {
        let body = RequestBody::OnCommand {
            id,
            command_type: kind.code(),
        };
        self.send_key(body, editor, EditSession::Unavailable)
    }

    /// Fetches the menu of button `button_id`.
    ///
    /// Returns `None` when the call fails or `return` is not an array.
    pub fn on_menu(&mut self, editor: &mut dyn EditorContext, button_id: &str) -> Option<Vec<MenuItem>> {
        let body = RequestBody::OnMenu {
            id: button_id.to_string(),
        };
        let response = self
            .send(body, editor, EditSession::Unavailable)
            .filter(|r| r.success)?;
        parse_menu(&response.return_value)
    }

    /// Fetches a button's menu and renders it with `renderer`.
    pub fn render_menu<R: MenuRenderer>(
        &mut self,
        editor: &mut dyn EditorContext,
        button_id: &str,
        renderer: &R,
    ) -> Option<R::Output> {
        self.on_menu(editor, button_id)
            .map(|items| renderer.render(&items))
    }

    // ── Notifications ─────────────────────────────────────────────────────

    pub fn on_compartment_changed(&mut self, editor: &mut dyn EditorContext, guid: Uuid) {
        let body = RequestBody::OnCompartmentChanged {
            guid: format_guid(&guid),
        };
        self.send(body, editor, EditSession::Unavailable);
    }

    pub fn on_keyboard_status_changed(&mut self, editor: &mut dyn EditorContext, opened: bool) {
        self.send(
            RequestBody::OnKeyboardStatusChanged { opened },
            editor,
            EditSession::Unavailable,
        );
    }

    pub fn on_composition_terminated(&mut self, editor: &mut dyn EditorContext, forced: bool) {
        self.send(
            RequestBody::OnCompositionTerminated { forced },
            editor,
            EditSession::Unavailable,
        );
    }

    /// Removes this client's language bar buttons from the host.
    pub fn teardown(&mut self, editor: &mut dyn EditorContext) {
        self.reconciler.teardown(editor);
        self.activated = false;
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn send_key(&mut self, body: RequestBody, editor: &mut dyn EditorContext, session: EditSession) -> bool {
        self.send(body, editor, session)
            .is_some_and(|r| r.success && r.return_bool())
    }

    fn send(
        &mut self,
        body: RequestBody,
        editor: &mut dyn EditorContext,
        session: EditSession,
    ) -> Option<Response> {
        let method = body.method();
        match self.client.call(body) {
            Ok(response) => {
                self.reconciler.apply(&response, editor, session);
                Some(response)
            }
            Err(e) => {
                debug!(method, "treating failed call as no reply: {e}");
                None
            }
        }
    }
}
