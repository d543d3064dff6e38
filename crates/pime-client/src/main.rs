//! PIME client: command-line driver.
//!
//! Runs one client against the shared record store the way a host text
//! service would: activate, feed key events, deactivate, tear down.  The
//! editor is the in-memory [`RecordingEditor`], whose final state is printed.
//!
//! # Usage
//!
//! ```text
//! pime-client [OPTIONS]
//!
//! Options:
//!   --queue-dir <DIR>     Directory of the file-backed store
//!   --profile <GUID>      Language profile sent in the init handshake
//!   --loopback            Serve requests in-process with an echo composer
//!   --type <TEXT>         Characters to send as key events
//!   --commit              Press Enter after typing
//! ```
//!
//! Without `--loopback` a PIME server must be servicing the same directory,
//! otherwise every call times out after about a second and the client
//! carries on with empty replies.
//!
//! # Environment variable overrides
//!
//! | Variable          | Description                          |
//! |-------------------|--------------------------------------|
//! | `PIME_QUEUE_DIR`  | Same as `--queue-dir`                |
//! | `PIME_PROFILE`    | Same as `--profile`                  |
//! | `RUST_LOG`        | Log filter; overrides `log_level`    |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pime_client::application::dispatch_event::EventDispatcher;
use pime_client::application::registry::ClientRegistry;
use pime_client::application::request_response::RequestResponseClient;
use pime_client::application::retry::RetryPolicy;
use pime_client::infrastructure::editor::RecordingEditor;
use pime_client::infrastructure::menu::LangBarMenuRenderer;
use pime_client::infrastructure::queue::loopback::MODE_BUTTON_ID;
use pime_client::infrastructure::queue::{
    EchoComposer, FileRecordStore, InMemoryRecordStore, LoopbackServer, QueueChannel,
    SharedRecordStore,
};
use pime_client::infrastructure::storage::{load_config, ClientConfig};
use pime_core::protocol::KeyEvent;

const VK_RETURN: u32 = 0x0D;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// PIME text service client driver.
#[derive(Debug, Parser)]
#[command(name = "pime-client", about = "Drive a PIME client over the shared record store", version)]
struct Cli {
    /// Directory of the file-backed store.  Defaults to the config value or `<tmp>/pime-queue`.
    #[arg(long, env = "PIME_QUEUE_DIR")]
    queue_dir: Option<PathBuf>,

    /// Language profile GUID.
    #[arg(long, env = "PIME_PROFILE")]
    profile: Option<Uuid>,

    /// Serve requests in-process with an echo composer instead of a real server.
    #[arg(long)]
    loopback: bool,

    /// Characters to send as key events after activation.
    #[arg(long = "type", default_value = "")]
    text: String,

    /// Press Enter after typing, committing the composition.
    #[arg(long)]
    commit: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pime-client: using default config: {e}");
            ClientConfig::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.client.log_level)),
        )
        .init();

    let profile = cli
        .profile
        .or(config.client.language_profile)
        .unwrap_or_else(Uuid::new_v4);
    let lock_policy = config.queue.lock_policy();
    let reply_policy = config.queue.reply_policy();

    if cli.loopback {
        let store = InMemoryRecordStore::new();
        let mut composer = EchoComposer::new();
        let server = LoopbackServer::spawn(
            store.clone(),
            lock_policy,
            Duration::from_millis(1),
            move |identity: &str, request: &pime_core::Request| composer.handle(identity, request),
        );
        let result = run(store, &cli, profile, lock_policy, reply_policy);
        server.shutdown();
        result
    } else {
        let dir = cli
            .queue_dir
            .clone()
            .unwrap_or_else(|| config.queue.store_dir_or_default());
        let store = FileRecordStore::open(&dir)
            .with_context(|| format!("failed to open queue directory {}", dir.display()))?;
        info!(dir = %dir.display(), "using file-backed store");
        run(store, &cli, profile, lock_policy, reply_policy)
    }
}

/// Runs one activate / type / deactivate session and prints the editor state.
fn run<S>(
    store: S,
    cli: &Cli,
    profile: Uuid,
    lock_policy: RetryPolicy,
    reply_policy: RetryPolicy,
) -> anyhow::Result<()>
where
    S: SharedRecordStore + Clone + 'static,
{
    let mut registry = ClientRegistry::new(move |profile| {
        let channel = QueueChannel::new(store.clone(), lock_policy);
        EventDispatcher::new(RequestResponseClient::new(channel, reply_policy), profile)
    });
    let mut editor = RecordingEditor::new();

    let dispatcher = registry.get_or_create(profile);
    if !dispatcher.on_activate(&mut editor) {
        warn!("activation was not acknowledged; continuing with empty replies");
    }

    let mut keys: Vec<KeyEvent> = cli.text.chars().map(key_for).collect();
    if cli.commit {
        keys.push(KeyEvent::simple('\r' as u32, VK_RETURN));
    }
    for key in &keys {
        if dispatcher.filter_key_down(&mut editor, key) {
            dispatcher.on_key_down(&mut editor, key);
        }
    }

    if editor.buttons.contains_key(MODE_BUTTON_ID) {
        if let Some(menu) = dispatcher.render_menu(&mut editor, MODE_BUTTON_ID, &LangBarMenuRenderer) {
            info!(entries = menu.len(), "fetched language bar menu");
        }
    }

    print_state(&editor);

    dispatcher.on_deactivate(&mut editor);
    registry.teardown_all(&mut editor);
    Ok(())
}

/// Builds the key-down event the host would report for `c`.
fn key_for(c: char) -> KeyEvent {
    let key_code = if c.is_ascii_alphanumeric() {
        c.to_ascii_uppercase() as u32
    } else if c == ' ' {
        0x20
    } else {
        0
    };
    KeyEvent::simple(c as u32, key_code)
}

fn print_state(editor: &RecordingEditor) {
    println!("committed:   {:?}", editor.committed);
    println!("composition: {:?} (cursor {})", editor.composition, editor.cursor);
    println!("composing:   {}", editor.state.is_composing());
    if !editor.candidates.is_empty() {
        println!("candidates:  {:?}", editor.candidates);
    }
    if let Some((message, _)) = &editor.message {
        println!("message:     {message:?}");
    }
    let buttons: Vec<&str> = editor.buttons.keys().map(String::as_str).collect();
    println!("buttons:     {buttons:?}");
}
