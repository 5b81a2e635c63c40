//! Incremental UTF-8 decoding of network chunks.
//!
//! The network hands us byte buffers split at arbitrary positions, so a
//! multi-byte character may start in one chunk and finish in the next.
//! [`Utf8Decoder`] carries the incomplete tail across calls instead of
//! decoding each chunk in isolation.

/// Stateful UTF-8 decoder.
///
/// `decode` returns the text decodable so far; bytes forming an incomplete
/// trailing sequence are held back until the rest arrives. A chunk that is
/// entirely mid-sequence yields an empty string. Invalid sequences are
/// replaced with U+FFFD and decoding continues.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a new decoder with no pending bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, combined with any bytes held back from the
    /// previous call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.pending);

        let mut out = String::new();
        let mut pos = 0;
        while pos < bytes.len() {
            match std::str::from_utf8(&bytes[pos..]) {
                Ok(valid) => {
                    out.push_str(valid);
                    pos = bytes.len();
                }
                Err(err) => {
                    let valid_to = pos + err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&bytes[pos..valid_to]));
                    match err.error_len() {
                        // Incomplete trailing sequence: hold it for the
                        // next chunk.
                        None => {
                            self.pending = bytes[valid_to..].to_vec();
                            return out;
                        }
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            pos = valid_to + bad;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush the decoder at end-of-stream.
    ///
    /// A sequence left dangling when the stream ends can never complete,
    /// so it decodes to a single U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }
}
