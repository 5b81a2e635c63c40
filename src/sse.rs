//! Server-Sent-Events-style frame parsing and pipeline assembly.
//!
//! The backend streams newline-delimited frames over a chunked response
//! body:
//!
//! ```text
//! data: Hello
//! data: {"content":" world"}
//!
//! data: [DONE]
//! ```
//!
//! Each `data:` payload carries a text delta, either raw or as a JSON
//! object with a `content` field (or nested under `delta.content`). The
//! `[DONE]` sentinel ends the stream; lines without the `data: ` prefix
//! are server comments or keepalives and are ignored.

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use crate::client::StreamError;
use crate::decode::Utf8Decoder;
use crate::model::FramePayload;

/// Text deltas of one streamed response, in arrival order.
pub type DeltaStream =
    std::pin::Pin<Box<dyn Stream<Item = Result<String, StreamError>> + Send>>;

const DATA_PREFIX: &str = "data: ";
const DONE_MARKER: &str = "[DONE]";

/// Parse a frame line to extract the data portion.
///
/// Frame lines are in the format: `data: <payload>`
///
/// # Example
/// ```
/// use deltastream::sse::parse_data_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_data_line(line), Some("{\"key\": \"value\"}"));
///
/// let line = "event: ping";
/// assert_eq!(parse_data_line(line), None);
/// ```
pub fn parse_data_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(str::trim)
}

/// Check if a frame payload marks the end of the stream.
///
/// # Example
/// ```
/// use deltastream::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker(""));
/// assert!(!is_done_marker("{\"content\": \"hi\"}"));
/// ```
pub fn is_done_marker(payload: &str) -> bool {
    payload == DONE_MARKER
}

/// Extract the text delta from a frame payload.
///
/// JSON payloads supply the delta through their `content` field, falling
/// back to `delta.content`; a JSON object with neither is a metadata frame
/// and yields nothing. A payload that is not valid JSON is itself the
/// delta. Empty payloads yield nothing.
pub fn extract_delta(payload: &str) -> Option<String> {
    if payload.is_empty() {
        return None;
    }
    match serde_json::from_str::<FramePayload>(payload) {
        Ok(frame) => frame.delta_text(),
        Err(_) => Some(payload.to_string()),
    }
}

/// Splits decoded text into frames and extracts their deltas.
///
/// Text fragments arrive split at arbitrary positions, so the trailing
/// incomplete line is carried over into the next call rather than being
/// treated as a complete frame. After the sentinel has been seen the
/// parser discards everything else.
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: String,
    done: bool,
}

impl FrameParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next decoded text fragment, returning the deltas of every
    /// complete frame it finishes.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.done {
            return deltas;
        }
        self.buffer.push_str(text);

        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].trim_end_matches('\r').to_string();
            self.buffer.drain(..=pos);

            if let Some(delta) = self.accept(&line) {
                deltas.push(delta);
            }
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        deltas
    }

    /// Flush the parser at end-of-stream, processing a final line that was
    /// never newline-terminated.
    pub fn finish(&mut self) -> Option<String> {
        if self.done || self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        self.accept(line.trim_end_matches('\r'))
    }

    /// True once the sentinel has been observed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn accept(&mut self, line: &str) -> Option<String> {
        let payload = parse_data_line(line)?;
        if is_done_marker(payload) {
            self.done = true;
            return None;
        }
        extract_delta(payload)
    }
}

/// Assemble the full pipeline over a byte stream: incremental UTF-8
/// decoding, frame parsing, and delta extraction.
///
/// The returned stream yields deltas in arrival order and ends at the
/// sentinel or when the byte stream does. A transport error ends the
/// stream after being yielded.
pub fn delta_stream<B>(bytes: B) -> impl Stream<Item = Result<String, StreamError>> + Send
where
    B: Stream<Item = Result<Bytes, StreamError>> + Send + 'static,
{
    async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = Utf8Decoder::new();
        let mut parser = FrameParser::new();

        while let Some(item) = bytes.next().await {
            match item {
                Ok(chunk) => {
                    let text = decoder.decode(&chunk);
                    for delta in parser.push(&text) {
                        yield Ok(delta);
                    }
                    if parser.is_done() {
                        return;
                    }
                }
                Err(error) => {
                    yield Err(error);
                    return;
                }
            }
        }

        // Body ended without a sentinel: flush the decoder tail and any
        // final unterminated line.
        let tail = decoder.finish();
        for delta in parser.push(&tail) {
            yield Ok(delta);
        }
        if let Some(delta) = parser.finish() {
            yield Ok(delta);
        }
    }
}

/// Extension trait for `reqwest::Response` to run the delta pipeline
/// directly over a response body.
///
/// # Example
/// ```ignore
/// use deltastream::sse::SseResponseExt;
///
/// let response = client.post(url).json(&body).send().await?;
/// let mut deltas = response.deltas();
/// while let Some(delta) = deltas.next().await {
///     print!("{}", delta?);
/// }
/// ```
pub trait SseResponseExt {
    /// Convert the response body into a stream of text deltas.
    fn deltas(self) -> DeltaStream;
}

impl SseResponseExt for reqwest::Response {
    fn deltas(self) -> DeltaStream {
        use futures::TryStreamExt;
        let bytes = self.bytes_stream().map_err(StreamError::from);
        Box::pin(delta_stream(bytes))
    }
}
