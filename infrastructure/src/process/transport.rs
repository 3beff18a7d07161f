//! Transport layer types for provider processes.
//!
//! - [`FrameBuffer`]: accumulates raw stdout chunks and yields complete
//!   newline-delimited frames, keeping any partial trailing bytes.
//! - [`MessageKind`] / [`classify_message`]: classifies each decoded frame
//!   so the reader task can dispatch it (response correlation, server request,
//!   or notification).

use serde_json::Value;

/// Incremental newline framing over an arbitrary byte stream.
///
/// Chunks may split a frame anywhere, including inside a multi-byte UTF-8
/// character; bytes are only interpreted once a full line is available.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
    /// Bytes already scanned for a newline, so each byte is searched once.
    scanned: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete frame without its delimiter (and without a
    /// trailing `\r`). Blank lines are skipped.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        loop {
            let offset = self.buf[self.scanned..].iter().position(|b| *b == b'\n');
            let Some(offset) = offset else {
                self.scanned = self.buf.len();
                return None;
            };
            let end = self.scanned + offset;
            let mut frame: Vec<u8> = self.buf.drain(..=end).collect();
            self.scanned = 0;
            frame.pop();
            if frame.last() == Some(&b'\r') {
                frame.pop();
            }
            if frame.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }
            return Some(frame);
        }
    }

    /// Bytes waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }
}

/// Classification of an incoming JSON-RPC message.
#[derive(Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// A response to a request we sent (has `id`, no `method`).
    Response,
    /// A request from the provider (has `id` + `method`), e.g. `ping`.
    ServerRequest,
    /// A notification (has `method`, no `id`).
    Notification,
    /// Neither `id` nor `method`: not a JSON-RPC message we understand.
    Invalid,
}

/// Classify a JSON-RPC message by inspecting `id` and `method` fields.
pub fn classify_message(json: &Value) -> MessageKind {
    let has_id = json.get("id").is_some_and(|v| !v.is_null());
    let has_method = json.get("method").and_then(Value::as_str).is_some();

    match (has_id, has_method) {
        (true, true) => MessageKind::ServerRequest,
        (true, false) => MessageKind::Response,
        (false, true) => MessageKind::Notification,
        (false, false) => MessageKind::Invalid,
    }
}
