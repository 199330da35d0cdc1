//! Wire frames and the incremental line decoder.
//!
//! One frame is one line: a compact JSON object terminated by `\n`. Compact
//! JSON never contains a raw newline (newlines inside strings are escaped),
//! so the delimiter is unambiguous and a malformed frame costs exactly one
//! line; parsing resynchronizes at the next `\n`.
//!
//! Envelope field names (`id`, `payload`, `data`, `error`) are a contract
//! with the backend services and must be held exactly.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::transport::error::TransportError;

/// Outgoing frame: `{"id": "<uuid>", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    pub id: String,
    pub payload: Value,
}

impl RequestFrame {
    pub fn new(id: Uuid, payload: Value) -> Self {
        Self {
            id: id.to_string(),
            payload,
        }
    }

    /// Encode as one newline-terminated line.
    pub fn encode(&self) -> Result<Vec<u8>, TransportError> {
        let mut bytes = serde_json::to_vec(self)
            .map_err(|e| TransportError::Protocol(format!("request not serializable: {}", e)))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Decode from one line (without the trailing newline).
    pub fn decode(line: &[u8]) -> Result<Self, TransportError> {
        serde_json::from_slice(line)
            .map_err(|e| TransportError::Protocol(format!("invalid request frame: {}", e)))
    }
}

/// Error payload a backend reports inside a reply frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

/// Backends report codes as either numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Number(i64),
    Text(String),
}

impl WireError {
    /// The numeric code interpreted as an HTTP status, when it is one.
    pub fn http_status(&self) -> Option<u16> {
        match self.code {
            Some(ErrorCode::Number(n)) if (400..=599).contains(&n) => Some(n as u16),
            _ => None,
        }
    }
}

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(ErrorCode::Number(n)) => write!(f, "{} (code {})", self.message, n),
            Some(ErrorCode::Text(t)) => write!(f, "{} (code {})", self.message, t),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Incoming frame: `{"id", "data"}` on success or `{"id", "error"}` on failure.
///
/// `data` keeps its presence bit: `{"data": null}` is a successful null
/// reply, while a frame with neither field is a protocol violation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFrame {
    pub id: String,
    pub data: Option<Value>,
    pub error: Option<WireError>,
}

impl ResponseFrame {
    pub fn ok(id: &str, data: Value) -> Self {
        Self {
            id: id.to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(id: &str, error: WireError) -> Self {
        Self {
            id: id.to_string(),
            data: None,
            error: Some(error),
        }
    }

    /// Decode from one line. Fields beyond `id` and `data`/`error` are
    /// ignored; assuming more than the contract gives is itself a bug.
    pub fn decode(line: &[u8]) -> Result<Self, TransportError> {
        let value: Value = serde_json::from_slice(line)
            .map_err(|e| TransportError::Protocol(format!("invalid reply frame: {}", e)))?;
        let object = value
            .as_object()
            .ok_or_else(|| TransportError::Protocol("reply frame is not an object".into()))?;

        let id = object
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| TransportError::Protocol("reply frame missing id".into()))?
            .to_string();

        let error = match object.get("error") {
            Some(raw) if !raw.is_null() => {
                Some(serde_json::from_value(raw.clone()).map_err(|e| {
                    TransportError::Protocol(format!("malformed error payload: {}", e))
                })?)
            }
            _ => None,
        };

        Ok(Self {
            id,
            data: object.get("data").cloned(),
            error,
        })
    }

    /// Encode as one newline-terminated line (used by tests and tooling).
    pub fn encode(&self) -> Vec<u8> {
        let frame = match (&self.data, &self.error) {
            (_, Some(error)) => json!({ "id": self.id, "error": error }),
            (data, None) => json!({ "id": self.id, "data": data.clone().unwrap_or(Value::Null) }),
        };
        let mut bytes = serde_json::to_vec(&frame).expect("frame is serializable");
        bytes.push(b'\n');
        bytes
    }

    /// Collapse into the caller-facing result.
    pub fn into_result(self) -> Result<Value, TransportError> {
        if let Some(error) = self.error {
            return Err(TransportError::Remote(error));
        }
        match self.data {
            Some(data) => Ok(data),
            None => Err(TransportError::Protocol(
                "reply frame carries neither data nor error".into(),
            )),
        }
    }
}

/// Accumulates socket reads and yields complete lines.
///
/// Every byte pushed is eventually consumed into zero or more complete
/// lines plus at most one partial trailing fragment kept for the next push.
pub struct FrameDecoder {
    buffer: BytesMut,
    max_frame_bytes: usize,
}

impl FrameDecoder {
    pub fn new(max_frame_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(16 * 1024),
            max_frame_bytes,
        }
    }

    /// Append bytes and extract all complete lines.
    ///
    /// An oversized complete line is dropped (parsing resumes after its
    /// newline). Returns an error only when the buffer grows past the frame
    /// limit with no delimiter in sight: there is no boundary to resync
    /// at, so the connection must be torn down.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<Bytes>, TransportError> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line = self.buffer.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            if line.is_empty() {
                continue;
            }
            if line.len() > self.max_frame_bytes {
                tracing::warn!(
                    frame_bytes = line.len(),
                    max_frame_bytes = self.max_frame_bytes,
                    "Oversized frame discarded"
                );
                continue;
            }
            lines.push(line.freeze());
        }

        if self.buffer.len() > self.max_frame_bytes {
            return Err(TransportError::Protocol(format!(
                "unterminated frame exceeds {} bytes",
                self.max_frame_bytes
            )));
        }

        Ok(lines)
    }

    /// Bytes currently buffered (the partial trailing fragment).
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> FrameDecoder {
        FrameDecoder::new(1024)
    }

    #[test]
    fn request_round_trip() {
        let id = Uuid::new_v4();
        let payload = json!({
            "type": "GET_USER",
            "data": { "id": 7, "tags": ["a", "b"], "empty": {}, "unicode": "héllo 世界" },
            "nested": [[1, 2], [3]],
        });
        let frame = RequestFrame::new(id, payload.clone());

        let encoded = frame.encode().unwrap();
        assert_eq!(*encoded.last().unwrap(), b'\n');

        let decoded = RequestFrame::decode(&encoded[..encoded.len() - 1]).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(decoded.payload, payload);
    }

    #[test]
    fn response_success_and_error() {
        let ok = ResponseFrame::decode(br#"{"id":"r1","data":{"name":"Alice"}}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), json!({"name": "Alice"}));

        let err = ResponseFrame::decode(br#"{"id":"r2","error":{"message":"nope","code":404}}"#)
            .unwrap();
        match err.into_result().unwrap_err() {
            TransportError::Remote(wire) => {
                assert_eq!(wire.message, "nope");
                assert_eq!(wire.http_status(), Some(404));
            }
            other => panic!("expected Remote, got {:?}", other),
        }
    }

    #[test]
    fn response_null_data_is_success() {
        let frame = ResponseFrame::decode(br#"{"id":"r1","data":null}"#).unwrap();
        assert_eq!(frame.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn response_without_data_or_error_is_protocol_error() {
        let frame = ResponseFrame::decode(br#"{"id":"r1"}"#).unwrap();
        assert!(matches!(
            frame.into_result(),
            Err(TransportError::Protocol(_))
        ));
    }

    #[test]
    fn response_missing_id_rejected() {
        let err = ResponseFrame::decode(br#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, TransportError::Protocol(_)));
    }

    #[test]
    fn string_error_codes_are_not_statuses() {
        let frame =
            ResponseFrame::decode(br#"{"id":"r","error":{"message":"m","code":"USER_NOT_FOUND"}}"#)
                .unwrap();
        assert_eq!(frame.error.unwrap().http_status(), None);
    }

    #[test]
    fn decoder_splits_multiple_lines() {
        let mut dec = decoder();
        let lines = dec.push(b"{\"id\":\"1\"}\n{\"id\":\"2\"}\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(&lines[0][..], br#"{"id":"1"}"#);
        assert_eq!(&lines[1][..], br#"{"id":"2"}"#);
        assert_eq!(dec.buffered(), 0);
    }

    #[test]
    fn decoder_keeps_partial_fragment() {
        let mut dec = decoder();
        assert!(dec.push(b"{\"id\":").unwrap().is_empty());
        assert_eq!(dec.buffered(), 6);

        let lines = dec.push(b"\"1\"}\n").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(dec.buffered(), 0);
    }

    #[test]
    fn byte_at_a_time_matches_whole_stream() {
        let stream = b"{\"id\":\"a\",\"data\":1}\n{\"id\":\"b\",\"data\":2}\n";

        let mut whole = decoder();
        let expected = whole.push(stream).unwrap();

        let mut dribble = decoder();
        let mut collected = Vec::new();
        for byte in stream {
            collected.extend(dribble.push(&[*byte]).unwrap());
        }

        assert_eq!(collected, expected);
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn crlf_and_blank_lines_tolerated() {
        let mut dec = decoder();
        let lines = dec.push(b"{\"id\":\"1\"}\r\n\n{\"id\":\"2\"}\n").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(&lines[0][..], br#"{"id":"1"}"#);
    }

    #[test]
    fn oversized_complete_line_is_skipped() {
        let mut dec = FrameDecoder::new(16);
        let mut input = vec![b'x'; 32];
        input.push(b'\n');
        input.extend_from_slice(b"{\"id\":\"ok\"}\n");

        let lines = dec.push(&input).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(&lines[0][..], br#"{"id":"ok"}"#);
    }

    #[test]
    fn unterminated_overflow_is_fatal() {
        let mut dec = FrameDecoder::new(16);
        let err = dec.push(&[b'x'; 64]).unwrap_err();
        assert!(matches!(err, TransportError::Protocol(_)));
    }
}
