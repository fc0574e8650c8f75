use std::str;

const REPLACEMENT: char = '\u{FFFD}';

/// A streaming UTF-8 decoder.
///
/// A multi-byte sequence split across two chunks is carried over and decoded
/// once the rest arrives, so the concatenated output never depends on where
/// the input was split. Invalid sequences decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete sequence at the end of the previous chunk.
    pending: Vec<u8>,
}

impl Utf8Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, holding back a trailing incomplete sequence.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let joined;
        let mut remaining = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            joined = std::mem::take(&mut self.pending);
            joined.as_slice()
        };

        let mut out = String::with_capacity(remaining.len());
        loop {
            match str::from_utf8(remaining) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(error) => {
                    let (valid, rest) = remaining.split_at(error.valid_up_to());
                    out.push_str(str::from_utf8(valid).unwrap_or_default());

                    match error.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            remaining = &rest[len..];
                        }
                        None => {
                            self.pending.extend_from_slice(rest);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Signal end of input. A dangling incomplete sequence becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }

        self.pending.clear();
        REPLACEMENT.to_string()
    }

    /// Whether bytes are being held back for the next chunk.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
