//! JSON codec for requests and responses.
//!
//! Payloads are written as compact, single-line JSON so that one message is
//! always exactly one queue line.  `serde_json` escapes embedded newlines in
//! strings, so the output never contains a raw `\n`.

use thiserror::Error;

use crate::protocol::messages::{Request, Response};

/// Errors that can occur while encoding or decoding a payload.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The message could not be serialized.
    #[error("failed to encode payload: {0}")]
    Encode(String),

    /// The payload text is not a valid message.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Request`] as one line of compact JSON (no trailing newline).
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use pime_core::protocol::{decode_request, encode_request, Request, RequestBody};
///
/// let req = Request { seq_num: 1, body: RequestBody::OnDeactivate };
/// let text = encode_request(&req).unwrap();
/// assert_eq!(text, r#"{"seqNum":1,"method":"onDeactivate"}"#);
/// assert_eq!(decode_request(&text).unwrap(), req);
/// ```
pub fn encode_request(request: &Request) -> Result<String, ProtocolError> {
    serde_json::to_string(request).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes a [`Request`] from payload text.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if the text is not a valid request.
pub fn decode_request(text: &str) -> Result<Request, ProtocolError> {
    serde_json::from_str(text.trim_end()).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

/// Encodes a [`Response`] as one line of compact JSON (no trailing newline).
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
pub fn encode_response(response: &Response) -> Result<String, ProtocolError> {
    serde_json::to_string(response).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes a [`Response`] from payload text.
///
/// Directive fields are decoded leniently (see [`crate::protocol::messages`]);
/// only text that is not JSON, or that lacks a numeric `seqNum`, is rejected.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedPayload`] if the text is not a valid response.
pub fn decode_response(text: &str) -> Result<Response, ProtocolError> {
    serde_json::from_str(text.trim_end()).map_err(|e| ProtocolError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::messages::{KeyEvent, RequestBody};

    #[test]
    fn test_encoded_request_is_single_line() {
        // Arrange – a guid containing a newline must be escaped, not emitted raw
        let req = Request {
            seq_num: 3,
            body: RequestBody::OnPreservedKey {
                guid: "line1\nline2".to_string(),
            },
        };

        // Act
        let text = encode_request(&req).unwrap();

        // Assert
        assert!(!text.contains('\n'));
        assert_eq!(decode_request(&text).unwrap(), req);
    }

    #[test]
    fn test_encoded_key_event_round_trips() {
        let req = Request {
            seq_num: 11,
            body: RequestBody::OnKeyDown(KeyEvent::simple(u32::from('a'), 0x41)),
        };
        let text = encode_request(&req).unwrap();
        assert_eq!(decode_request(&text).unwrap(), req);
    }

    #[test]
    fn test_decode_response_rejects_non_json() {
        let result = decode_response("definitely not json");
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_response_rejects_string_seq_num() {
        let result = decode_response(r#"{"seqNum":"1","success":true}"#);
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[test]
    fn test_decode_response_tolerates_trailing_newline() {
        let resp = decode_response("{\"seqNum\":5,\"success\":true}\n").unwrap();
        assert_eq!(resp.seq_num, 5);
        assert!(resp.success);
    }

    #[test]
    fn test_decode_request_rejects_unknown_method() {
        let result = decode_request(r#"{"seqNum":1,"method":"reboot"}"#);
        assert!(result.is_err());
    }
}
