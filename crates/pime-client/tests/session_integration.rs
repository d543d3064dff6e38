//! Integration tests for whole client sessions.
//!
//! Each test runs a loopback server with the echo composer on a background
//! thread and drives one or more `EventDispatcher`s against the same shared
//! store, applying replies to a `RecordingEditor`.

use std::time::Duration;

use pime_client::application::dispatch_event::EventDispatcher;
use pime_client::application::registry::ClientRegistry;
use pime_client::application::request_response::RequestResponseClient;
use pime_client::application::retry::RetryPolicy;
use pime_client::infrastructure::editor::RecordingEditor;
use pime_client::infrastructure::menu::lang_bar::{LBMENUF_CHECKED, LBMENUF_SEPARATOR};
use pime_client::infrastructure::menu::LangBarMenuRenderer;
use pime_client::infrastructure::queue::loopback::MODE_BUTTON_ID;
use pime_client::infrastructure::queue::{
    EchoComposer, FileRecordStore, InMemoryRecordStore, LoopbackServer, QueueChannel,
    SharedRecordStore,
};
use pime_core::protocol::KeyEvent;
use pime_core::Request;
use uuid::Uuid;

const VK_RETURN: u32 = 0x0D;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn start_loopback<S>(store: S) -> LoopbackServer
where
    S: SharedRecordStore + Send + 'static,
{
    let mut composer = EchoComposer::new();
    LoopbackServer::spawn(
        store,
        RetryPolicy::default(),
        Duration::from_millis(1),
        move |identity: &str, request: &Request| composer.handle(identity, request),
    )
}

fn dispatcher<S: SharedRecordStore>(store: S) -> EventDispatcher<QueueChannel<S>> {
    let channel = QueueChannel::new(store, RetryPolicy::default());
    let client = RequestResponseClient::new(channel, RetryPolicy::new(5000, Duration::from_millis(1)));
    EventDispatcher::new(client, Uuid::new_v4())
}

fn letter(c: char) -> KeyEvent {
    KeyEvent::simple(c as u32, c.to_ascii_uppercase() as u32)
}

fn press<S: SharedRecordStore>(
    dispatcher: &mut EventDispatcher<QueueChannel<S>>,
    editor: &mut RecordingEditor,
    key: &KeyEvent,
) -> bool {
    dispatcher.filter_key_down(editor, key) && dispatcher.on_key_down(editor, key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn test_typed_text_is_composed_then_committed() {
    // Arrange
    let store = InMemoryRecordStore::new();
    let server = start_loopback(store.clone());
    let mut dispatcher = dispatcher(store);
    let mut editor = RecordingEditor::new();

    // Act
    assert!(dispatcher.on_activate(&mut editor), "loopback acknowledges activation");
    assert!(press(&mut dispatcher, &mut editor, &letter('h')));
    assert!(press(&mut dispatcher, &mut editor, &letter('i')));
    let composing = editor.clone();
    assert!(press(&mut dispatcher, &mut editor, &KeyEvent::simple('\r' as u32, VK_RETURN)));
    server.shutdown();

    // Assert
    assert!(composing.state.is_composing());
    assert_eq!(composing.composition, "hi");
    assert_eq!(composing.cursor, 2);
    assert_eq!(editor.committed, "hi");
    assert!(!editor.state.is_composing());
    assert_eq!(editor.start_calls, 1, "one composition for the whole word");
}

#[test]
fn test_unwanted_key_is_not_consumed() {
    // Arrange
    let store = InMemoryRecordStore::new();
    let server = start_loopback(store.clone());
    let mut dispatcher = dispatcher(store);
    let mut editor = RecordingEditor::new();
    dispatcher.on_activate(&mut editor);

    // Act: Enter with nothing composed
    let consumed = dispatcher.filter_key_down(&mut editor, &KeyEvent::simple('\r' as u32, VK_RETURN));
    server.shutdown();

    // Assert
    assert!(!consumed);
    assert_eq!(editor.start_calls, 0);
}

#[test]
fn test_activation_adds_button_and_teardown_removes_it() {
    // Arrange
    let store = InMemoryRecordStore::new();
    let server = start_loopback(store.clone());
    let factory_store = store.clone();
    let mut registry = ClientRegistry::new(move |_profile| dispatcher(factory_store.clone()));
    let mut editor = RecordingEditor::new();
    let profile = Uuid::new_v4();

    // Act
    registry.get_or_create(profile).on_activate(&mut editor);
    let after_activation = editor.buttons.clone();
    registry.get_or_create(profile).on_deactivate(&mut editor);
    registry.teardown_all(&mut editor);
    server.shutdown();

    // Assert
    assert!(after_activation.contains_key(MODE_BUTTON_ID));
    assert!(editor.buttons.is_empty(), "teardown removes every button it added");
}

#[test]
fn test_button_menu_is_rendered_for_language_bar() {
    // Arrange
    let store = InMemoryRecordStore::new();
    let server = start_loopback(store.clone());
    let mut dispatcher = dispatcher(store);
    let mut editor = RecordingEditor::new();
    dispatcher.on_activate(&mut editor);

    // Act
    let menu = dispatcher.render_menu(&mut editor, MODE_BUTTON_ID, &LangBarMenuRenderer);
    let unknown = dispatcher.on_menu(&mut editor, "no-such-button");
    server.shutdown();

    // Assert
    let menu = menu.expect("echo composer serves a menu for its button");
    assert_eq!(menu.len(), 3);
    assert_eq!(menu[0].text, "Chinese");
    assert_ne!(menu[0].flags & LBMENUF_CHECKED, 0);
    assert_ne!(menu[1].flags & LBMENUF_SEPARATOR, 0);
    assert_eq!(menu[2].id, 11);
    assert!(unknown.is_none(), "a null return value is not a menu");
}

#[test]
fn test_two_clients_on_one_store_get_their_own_replies() {
    // Arrange
    let store = InMemoryRecordStore::new();
    let server = start_loopback(store.clone());
    let mut first = dispatcher(store.clone());
    let mut second = dispatcher(store);
    let mut first_editor = RecordingEditor::new();
    let mut second_editor = RecordingEditor::new();
    first.on_activate(&mut first_editor);
    second.on_activate(&mut second_editor);

    // Act
    for (a, b) in "abc".chars().zip("xyz".chars()) {
        press(&mut first, &mut first_editor, &letter(a));
        press(&mut second, &mut second_editor, &letter(b));
    }
    server.shutdown();

    // Assert
    assert_ne!(first.identity(), second.identity());
    assert_eq!(first_editor.composition, "abc");
    assert_eq!(second_editor.composition, "xyz");
}

#[test]
fn test_session_over_file_backed_store() {
    // Arrange
    let dir = std::env::temp_dir().join(format!("pime-session-{}", Uuid::new_v4()));
    let store = FileRecordStore::open(&dir).expect("temp dir is writable");
    let server = start_loopback(store.clone());
    let mut dispatcher = dispatcher(store);
    let mut editor = RecordingEditor::new();

    // Act
    let activated = dispatcher.on_activate(&mut editor);
    press(&mut dispatcher, &mut editor, &letter('o'));
    press(&mut dispatcher, &mut editor, &letter('k'));
    press(&mut dispatcher, &mut editor, &KeyEvent::simple('\r' as u32, VK_RETURN));
    server.shutdown();

    // Assert
    assert!(activated);
    assert_eq!(editor.committed, "ok");
    assert!(!dir.join("queue.lock").exists(), "lock file removed after every operation");

    // Cleanup
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_without_server_every_event_degrades_to_no_reply() {
    // Arrange
    let store = InMemoryRecordStore::new();
    let channel = QueueChannel::new(store.clone(), RetryPolicy::new(5, Duration::ZERO));
    let client = RequestResponseClient::new(channel, RetryPolicy::new(5, Duration::ZERO));
    let mut dispatcher = EventDispatcher::new(client, Uuid::new_v4());
    let mut editor = RecordingEditor::new();

    // Act
    let activated = dispatcher.on_activate(&mut editor);
    let consumed = dispatcher.filter_key_down(&mut editor, &letter('a'));

    // Assert
    assert!(!activated);
    assert!(!dispatcher.is_initialized(), "init is retried on the next activation");
    assert!(!consumed);
    assert!(editor.buttons.is_empty());
    assert_eq!(editor.start_calls, 0);
    assert!(!store.is_held(), "lock released after the failed calls");
}
