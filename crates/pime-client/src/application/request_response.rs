//! RequestResponseClient: one synchronous call to the server.
//!
//! A call numbers the request, appends it to the input lane, then polls the
//! output lane for the first line tagged with this client's identity.  The
//! reply is only accepted when its `seqNum` matches the request.
//!
//! # Correlation (for beginners)
//!
//! Many clients share the same two lanes.  The identity tag at the start of
//! each line says which client a reply belongs to; the sequence number says
//! which request of that client it answers.  A client only ever has one
//! request in flight, so a reply with the wrong number is stale (for example
//! the answer to an earlier call that timed out).  It is dropped, never handed
//! to the caller, and never put back.

use pime_core::protocol::{decode_response, encode_request, SequenceCounter};
use pime_core::{ClientIdentity, ProtocolError, QueueRecord, Request, RequestBody, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::retry::RetryPolicy;

/// Failure of one transport operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("shared store lock not acquired after {attempts} attempts")]
    LockTimeout { attempts: u32 },
    #[error("no record for this identity in the output lane")]
    NotFound,
    #[error("shared store error: {0}")]
    Store(String),
}

/// Failure of a whole call.  Callers treat every variant as "no response".
#[derive(Debug, Error)]
pub enum CallError {
    #[error("failed to send request: {0}")]
    Send(TransportError),
    #[error("failed to encode request: {0}")]
    Encode(#[from] ProtocolError),
    #[error("no reply within the wait budget")]
    NoMatchingReply,
    #[error("malformed reply: {0}")]
    MalformedReply(String),
    #[error("reply seqNum {received} does not match request seqNum {expected}")]
    SequenceMismatch { expected: u64, received: u64 },
}

/// The two locked operations on the shared lanes.
pub trait QueueTransport {
    /// Appends `record` as one line to the input lane.
    fn append_input(&self, record: &QueueRecord) -> Result<(), TransportError>;

    /// Removes and returns the payload of the first complete output-lane line
    /// tagged `identity`.  Returns [`TransportError::NotFound`] when there is none.
    fn scan_and_extract_output(&self, identity: &str) -> Result<String, TransportError>;
}

impl<T: QueueTransport + ?Sized> QueueTransport for &T {
    fn append_input(&self, record: &QueueRecord) -> Result<(), TransportError> {
        (**self).append_input(record)
    }

    fn scan_and_extract_output(&self, identity: &str) -> Result<String, TransportError> {
        (**self).scan_and_extract_output(identity)
    }
}

/// Sends requests for one client identity and waits for the matching reply.
pub struct RequestResponseClient<T> {
    transport: T,
    identity: ClientIdentity,
    sequence: SequenceCounter,
    reply_wait: RetryPolicy,
}

impl<T: QueueTransport> RequestResponseClient<T> {
    /// Creates a client with a freshly generated identity.
    pub fn new(transport: T, reply_wait: RetryPolicy) -> Self {
        Self::with_identity(transport, ClientIdentity::generate(), reply_wait)
    }

    pub fn with_identity(transport: T, identity: ClientIdentity, reply_wait: RetryPolicy) -> Self {
        Self {
            transport,
            identity,
            sequence: SequenceCounter::new(),
            reply_wait,
        }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one request/reply exchange.
    ///
    /// # Errors
    ///
    /// - [`CallError::Send`] if the request could not be appended; no reply is awaited.
    /// - [`CallError::NoMatchingReply`] if nothing arrived within the wait budget.
    /// - [`CallError::MalformedReply`] if the reply is not a valid response.
    /// - [`CallError::SequenceMismatch`] if the reply answers another request.
    pub fn call(&self, body: RequestBody) -> Result<Response, CallError> {
        let request = Request {
            seq_num: self.sequence.next(),
            body,
        };
        let payload = encode_request(&request)?;
        let tag = self.identity.tag();
        debug!(
            method = request.body.method(),
            seq = request.seq_num,
            bytes = payload.len(),
            "sending request"
        );

        self.transport
            .append_input(&QueueRecord::new(tag.clone(), payload))
            .map_err(|e| {
                warn!(method = request.body.method(), "request not sent: {e}");
                CallError::Send(e)
            })?;

        let reply = self
            .reply_wait
            .retry(|| match self.transport.scan_and_extract_output(&tag) {
                Ok(payload) => Some(payload),
                Err(TransportError::NotFound) => None,
                Err(e) => {
                    debug!("reply poll failed: {e}");
                    None
                }
            })
            .ok_or_else(|| {
                warn!(
                    method = request.body.method(),
                    seq = request.seq_num,
                    waited_ms = self.reply_wait.budget().as_millis() as u64,
                    "no reply from server"
                );
                CallError::NoMatchingReply
            })?;

        let response = decode_response(&reply).map_err(|e| {
            warn!(seq = request.seq_num, "malformed reply: {e}");
            CallError::MalformedReply(e.to_string())
        })?;

        if response.seq_num != request.seq_num {
            warn!(
                expected = request.seq_num,
                received = response.seq_num,
                "discarding reply with mismatched seqNum"
            );
            return Err(CallError::SequenceMismatch {
                expected: request.seq_num,
                received: response.seq_num,
            });
        }

        debug!(seq = response.seq_num, success = response.success, "reply accepted");
        Ok(response)
    }
}
