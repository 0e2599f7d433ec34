//! Incremental decoding of a streamed completion body.
//!
//! The transport hands out byte chunks with no regard for character or record
//! boundaries. Decoding happens in three layers, each buffering whatever it
//! cannot finish yet:
//!
//! 1. [`Utf8Decoder`] turns bytes into text, holding back an incomplete
//!    multi-byte sequence at the end of a chunk.
//! 2. [`EventSplitter`] cuts the text on the `data: ` record delimiter,
//!    holding back the unterminated trailing fragment.
//! 3. [`deltas`] parses each fragment as a [`ChatCompletionChunkResponse`] and
//!    yields the non-empty `choices[0].delta.content` values. Fragments that
//!    do not parse (the `[DONE]` sentinel, keep-alive comments, garbage) are
//!    skipped.
//!
//! A delimiter only counts at the start of a line. JSON payloads never
//! contain a raw newline, so assistant text that happens to contain
//! `data: ` can't split a record.

use bytes::Bytes;
use futures_core::Stream;
use futures_util::StreamExt;

use crate::{api_v1::ChatCompletionChunkResponse, error::OpenAiError};

/// Record delimiter of the event stream.
pub const DATA_PREFIX: &str = "data: ";

const LINE_ANCHORED_PREFIX: &str = "\ndata: ";

/// Bytes → text, safe across chunk boundaries.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` (plus earlier leftovers) as possible.
    ///
    /// An incomplete sequence at the end is kept for the next call; invalid
    /// sequences are replaced with U+FFFD.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    match err.error_len() {
                        // truncated sequence: wait for more bytes
                        None => {
                            out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(len) => {
                            out.push_str(&String::from_utf8_lossy(&self.pending[..valid + len]));
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush leftovers at end-of-stream.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Text → record fragments, safe across chunk boundaries.
#[derive(Debug)]
pub struct EventSplitter {
    buffer: String,
}

impl Default for EventSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSplitter {
    pub fn new() -> Self {
        // The stream starts at the beginning of a line.
        Self {
            buffer: "\n".into(),
        }
    }

    /// Feed decoded text; returns every fragment that is now known to be
    /// complete, i.e. followed by another delimiter.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        let mut fragments = Vec::new();

        while let Some(pos) = self.buffer.find(LINE_ANCHORED_PREFIX) {
            let fragment: String = self.buffer.drain(..pos).collect();
            self.buffer.drain(..LINE_ANCHORED_PREFIX.len());
            if !fragment.trim().is_empty() {
                fragments.push(fragment);
            }
        }

        fragments
    }

    /// The unterminated trailing fragment.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Remove and return the trailing fragment.
    ///
    /// Used both at end-of-stream and when the trailing fragment already
    /// parses as a complete record.
    pub fn take_pending(&mut self) -> Option<String> {
        let line_start = self.buffer.ends_with('\n');
        let fragment = std::mem::take(&mut self.buffer);
        if line_start {
            self.buffer.push('\n');
        }

        if fragment.trim().is_empty() {
            None
        } else {
            Some(fragment)
        }
    }
}

/// Parse one record fragment. `None` for anything that is not a chunk.
pub fn parse_record(fragment: &str) -> Option<ChatCompletionChunkResponse> {
    match serde_json::from_str(fragment.trim()) {
        Ok(chunk) => Some(chunk),
        Err(err) => {
            tracing::debug!(fragment = fragment.trim(), error = %err, "skipping unparseable stream record");
            None
        }
    }
}

/// Turn a raw body stream into a stream of non-empty text deltas.
///
/// Transport errors end the stream with an `Err` item; malformed records are
/// skipped.
pub fn deltas<S, E>(body: S) -> impl Stream<Item = Result<String, OpenAiError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send,
    E: Into<OpenAiError> + Send,
{
    async_stream::try_stream! {
        futures_util::pin_mut!(body);

        let mut decoder = Utf8Decoder::new();
        let mut splitter = EventSplitter::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|err| -> OpenAiError { err.into() })?;
            let text = decoder.decode(&chunk);

            for fragment in splitter.push(&text) {
                if let Some(delta) = parse_record(&fragment).and_then(|c| c.content_delta()) {
                    yield delta;
                }
            }

            // A complete record sitting at the end of the buffer does not need
            // to wait for the next delimiter.
            let ready = serde_json::from_str::<ChatCompletionChunkResponse>(splitter.pending().trim()).ok();
            if let Some(record) = ready {
                splitter.take_pending();
                if let Some(delta) = record.content_delta() {
                    yield delta;
                }
            }
        }

        let tail = decoder.finish();
        for fragment in splitter.push(&tail) {
            if let Some(delta) = parse_record(&fragment).and_then(|c| c.content_delta()) {
                yield delta;
            }
        }
        if let Some(fragment) = splitter.take_pending() {
            if let Some(delta) = parse_record(&fragment).and_then(|c| c.content_delta()) {
                yield delta;
            }
        }
    }
}
