//! In-process stand-in for the PIME server.
//!
//! # What is the loopback server for? (for beginners)
//!
//! The real server is a separate program.  To exercise the whole client
//! path (lock, append, poll, extract, reconcile) without it, the loopback
//! server runs on a background thread, repeatedly drains the input lane,
//! answers each request with a handler closure, and appends the answers to
//! the output lane, tagged with the identity of the client that asked.
//!
//! [`EchoComposer`] is a tiny handler that behaves like a trivial input
//! method: printable keys are echoed into the composition and Enter commits
//! it.  The `pime-client --loopback` demo and the integration tests use it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pime_core::protocol::{ButtonDescriptor, ButtonStyle, KeyEvent};
use pime_core::{decode_request, encode_response, QueueRecord, Request, RequestBody, Response};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::request_response::TransportError;
use crate::application::retry::RetryPolicy;

use super::channel::QueueChannel;
use super::store::SharedRecordStore;

/// Answers every request currently in the input lane.
///
/// Requests that fail to decode are logged and dropped.  Returns the number
/// of replies written.
pub fn serve_pending<S, H>(channel: &QueueChannel<S>, handler: &mut H) -> Result<usize, TransportError>
where
    S: SharedRecordStore,
    H: FnMut(&str, &Request) -> Response,
{
    let records = channel.drain_input()?;
    let mut replies = Vec::with_capacity(records.len());
    for record in records {
        let request = match decode_request(&record.payload) {
            Ok(request) => request,
            Err(e) => {
                warn!(identity = %record.identity, "loopback dropped undecodable request: {e}");
                continue;
            }
        };
        let response = handler(&record.identity, &request);
        match encode_response(&response) {
            Ok(payload) => replies.push(QueueRecord::new(record.identity, payload)),
            Err(e) => warn!("loopback failed to encode reply: {e}"),
        }
    }
    channel.append_output(&replies)?;
    Ok(replies.len())
}

/// A background thread servicing one shared store.
pub struct LoopbackServer {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl LoopbackServer {
    /// Starts serving `store`, polling the input lane every `poll`.
    pub fn spawn<S, H>(store: S, lock_policy: RetryPolicy, poll: Duration, mut handler: H) -> Self
    where
        S: SharedRecordStore + Send + 'static,
        H: FnMut(&str, &Request) -> Response + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let worker = thread::spawn(move || {
            let channel = QueueChannel::new(store, lock_policy);
            info!("loopback server started");
            while !flag.load(Ordering::Acquire) {
                match serve_pending(&channel, &mut handler) {
                    Ok(0) => thread::sleep(poll),
                    Ok(n) => debug!(replies = n, "loopback served requests"),
                    Err(e) => {
                        debug!("loopback poll failed: {e}");
                        thread::sleep(poll);
                    }
                }
            }
            info!("loopback server stopped");
        });
        Self {
            stop,
            worker: Some(worker),
        }
    }

    /// Stops the thread and waits for it to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("loopback server thread panicked");
            }
        }
    }
}

impl Drop for LoopbackServer {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

// ── Echo composer ─────────────────────────────────────────────────────────────

const VK_BACK: u32 = 0x08;
const VK_RETURN: u32 = 0x0D;
const VK_ESCAPE: u32 = 0x1B;

/// Id of the language bar button the composer adds on activation.
pub const MODE_BUTTON_ID: &str = "pime-mode";

/// A trivial input method: echoes printable keys, commits on Enter.
#[derive(Debug, Default)]
pub struct EchoComposer {
    buffers: HashMap<String, String>,
}

impl EchoComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one request from client `identity`.
    pub fn handle(&mut self, identity: &str, request: &Request) -> Response {
        let mut response = Response::success(request.seq_num);
        let buffer = self.buffers.entry(identity.to_string()).or_default();
        match &request.body {
            RequestBody::OnActivate { .. } => {
                response.add_button = Some(vec![ButtonDescriptor {
                    id: MODE_BUTTON_ID.to_string(),
                    style: Some(ButtonStyle::Menu),
                    text: Some("中".to_string()),
                    tooltip: Some("Input mode".to_string()),
                    command_id: Some(1),
                    ..ButtonDescriptor::default()
                }]);
            }
            RequestBody::OnDeactivate => buffer.clear(),
            RequestBody::FilterKeyDown(key) => {
                response.return_value = json!(wants_key(key, buffer));
            }
            RequestBody::OnKeyDown(key) => {
                let handled = wants_key(key, buffer);
                if handled {
                    compose(key, buffer, &mut response);
                }
                response.return_value = json!(handled);
            }
            RequestBody::OnMenu { id } if id == MODE_BUTTON_ID => {
                response.return_value = json!([
                    {"id": 10, "text": "Chinese", "checked": true},
                    {},
                    {"id": 11, "text": "English"}
                ]);
            }
            RequestBody::OnCompositionTerminated { .. } => buffer.clear(),
            _ => {}
        }
        response
    }
}

fn printable(key: &KeyEvent) -> Option<char> {
    char::from_u32(key.char_code).filter(|c| !c.is_control())
}

fn wants_key(key: &KeyEvent, buffer: &str) -> bool {
    printable(key).is_some()
        || (!buffer.is_empty() && matches!(key.key_code, VK_BACK | VK_RETURN | VK_ESCAPE))
}

fn compose(key: &KeyEvent, buffer: &mut String, response: &mut Response) {
    match key.key_code {
        VK_RETURN => {
            response.commit_string = Some(std::mem::take(buffer));
            return;
        }
        VK_BACK => {
            buffer.pop();
        }
        VK_ESCAPE => buffer.clear(),
        _ => {
            if let Some(c) = printable(key) {
                buffer.push(c);
            }
        }
    }
    response.composition_string = Some(buffer.clone());
    response.composition_cursor = Some(buffer.chars().count() as i64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::request_response::QueueTransport;
    use crate::infrastructure::queue::memory::InMemoryRecordStore;
    use crate::infrastructure::queue::store::Lane;
    use pime_core::{decode_response, encode_request};

    fn request(seq: u64, body: RequestBody) -> Request {
        Request { seq_num: seq, body }
    }

    fn key(c: char, code: u32) -> KeyEvent {
        KeyEvent::simple(c as u32, code)
    }

    #[test]
    fn test_serve_pending_tags_reply_with_identity() {
        // Arrange
        let store = InMemoryRecordStore::new();
        let payload = encode_request(&request(4, RequestBody::OnDeactivate)).unwrap();
        store.seed_lane(Lane::Input, &format!("me\t{payload}\nbad\tnot json\n"));
        let channel = QueueChannel::new(store.clone(), RetryPolicy::default());
        let mut handler = |_: &str, r: &Request| Response::success(r.seq_num);

        // Act
        let served = serve_pending(&channel, &mut handler).unwrap();

        // Assert
        assert_eq!(served, 1);
        assert_eq!(store.lane_snapshot(Lane::Input), "");
        let output = store.lane_snapshot(Lane::Output);
        let (identity, body) = output.trim_end().split_once('\t').unwrap();
        assert_eq!(identity, "me");
        assert_eq!(decode_response(body).unwrap().seq_num, 4);
    }

    #[test]
    fn test_echo_composer_composes_and_commits() {
        // Arrange
        let mut composer = EchoComposer::new();

        // Act
        let first = composer.handle("c", &request(0, RequestBody::OnKeyDown(key('h', 0x48))));
        let second = composer.handle("c", &request(1, RequestBody::OnKeyDown(key('i', 0x49))));
        let enter = composer.handle("c", &request(2, RequestBody::OnKeyDown(key('\r', VK_RETURN))));

        // Assert
        assert_eq!(first.composition_string.as_deref(), Some("h"));
        assert_eq!(second.composition_string.as_deref(), Some("hi"));
        assert_eq!(second.composition_cursor, Some(2));
        assert_eq!(enter.commit_string.as_deref(), Some("hi"));
        assert!(enter.return_bool());
    }

    #[test]
    fn test_echo_composer_ignores_enter_with_empty_buffer() {
        let mut composer = EchoComposer::new();
        let reply = composer.handle("c", &request(0, RequestBody::FilterKeyDown(key('\r', VK_RETURN))));
        assert!(!reply.return_bool());
    }

    #[test]
    fn test_echo_composer_keeps_buffers_per_client() {
        let mut composer = EchoComposer::new();
        composer.handle("a", &request(0, RequestBody::OnKeyDown(key('x', 0x58))));
        let reply = composer.handle("b", &request(0, RequestBody::OnKeyDown(key('y', 0x59))));
        assert_eq!(reply.composition_string.as_deref(), Some("y"));
    }

    #[test]
    fn test_backspace_to_empty_sends_empty_composition() {
        let mut composer = EchoComposer::new();
        composer.handle("c", &request(0, RequestBody::OnKeyDown(key('x', 0x58))));
        let reply = composer.handle("c", &request(1, RequestBody::OnKeyDown(key('\u{8}', VK_BACK))));
        assert_eq!(reply.composition_string.as_deref(), Some(""));
    }

    #[test]
    fn test_server_thread_answers_and_stops() {
        // Arrange
        let store = InMemoryRecordStore::new();
        let server = LoopbackServer::spawn(
            store.clone(),
            RetryPolicy::default(),
            Duration::from_millis(1),
            |_: &str, r: &Request| Response::success(r.seq_num),
        );
        let payload = encode_request(&request(9, RequestBody::OnDeactivate)).unwrap();
        let channel = QueueChannel::new(store.clone(), RetryPolicy::default());
        channel.append_input(&QueueRecord::new("me", payload)).unwrap();

        // Act
        let reply = RetryPolicy::new(2000, Duration::from_millis(1))
            .retry(|| channel.scan_and_extract_output("me").ok());
        server.shutdown();

        // Assert
        assert_eq!(decode_response(&reply.unwrap()).unwrap().seq_num, 9);
    }
}
