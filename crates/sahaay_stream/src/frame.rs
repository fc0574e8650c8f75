//! See [`FrameParser`].

use std::{mem, ops::ControlFlow};

use serde::Deserialize;
use serde_json::Value;
use tracing::{trace, warn};

use crate::decoder::Utf8Decoder;

/// Lines starting with this carry a JSON payload.
pub const DATA_PREFIX: &str = "data:";

/// Lines starting with this are comments or keepalives.
pub const COMMENT_PREFIX: char = ':';

/// The payload marking the end of the stream.
///
/// See: <https://openrouter.ai/docs/api-reference/streaming>
pub const TERMINAL_SENTINEL: &str = "[DONE]";

/// How many continuation lines a deferred data frame may absorb before it is
/// dropped as malformed.
pub const DEFAULT_MAX_CONTINUATIONS: usize = 32;

/// An event decoded from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// A fragment of assistant text.
    Delta(String),

    /// The stream is complete. Always the last event of a parser.
    Terminal,
}

impl FrameEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }

    #[must_use]
    pub fn into_delta(self) -> Option<String> {
        match self {
            Self::Delta(text) => Some(text),
            Self::Terminal => None,
        }
    }
}

/// A data frame whose payload did not parse yet.
///
/// Its JSON was cut at a literal newline; following lines are joined onto it
/// until it parses, a new frame starts, or the continuation budget runs out.
#[derive(Debug)]
struct Deferred {
    payload: String,
    continuations: usize,
}

/// Reassembles a chunked, newline-delimited event stream into
/// [`FrameEvent`]s.
///
/// Call [`FrameParser::feed`] for every chunk, and [`FrameParser::flush`] once
/// the source is exhausted. The events produced for a given byte stream do not
/// depend on how that stream was chunked.
#[derive(Debug)]
pub struct FrameParser {
    decoder: Utf8Decoder,

    /// Decoded text that does not yet form a complete line.
    buffer: String,

    deferred: Option<Deferred>,
    max_continuations: usize,

    /// Number of data frames dropped because they never parsed.
    dropped: usize,

    /// Set once [`FrameEvent::Terminal`] was emitted.
    finished: bool,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: Utf8Decoder::new(),
            buffer: String::new(),
            deferred: None,
            max_continuations: DEFAULT_MAX_CONTINUATIONS,
            dropped: 0,
            finished: false,
        }
    }

    #[must_use]
    pub fn with_max_continuations(mut self, max_continuations: usize) -> Self {
        self.max_continuations = max_continuations;
        self
    }

    /// Whether the terminal event has been emitted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of malformed data frames dropped so far.
    #[must_use]
    pub fn dropped_frames(&self) -> usize {
        self.dropped
    }

    /// Feed the next chunk of raw bytes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<FrameEvent> {
        if self.finished {
            return vec![];
        }

        let text = self.decoder.decode(chunk);
        self.buffer.push_str(&text);

        let mut events = vec![];
        while let Some(line) = self.next_line() {
            if self.process_line(&line, &mut events).is_break() {
                break;
            }
        }

        events
    }

    /// Process whatever is left once the source is exhausted.
    ///
    /// A final line without a trailing newline is still processed. A deferred
    /// frame that is still incomplete is dropped. Ends with
    /// [`FrameEvent::Terminal`], unless the stream already terminated.
    pub fn flush(&mut self) -> Vec<FrameEvent> {
        if self.finished {
            return vec![];
        }

        let tail = self.decoder.finish();
        self.buffer.push_str(&tail);
        let rest = mem::take(&mut self.buffer);

        let mut events = vec![];
        for line in rest.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if self.process_line(line, &mut events).is_break() {
                return events;
            }
        }

        if let Some(deferred) = self.deferred.take() {
            self.drop_malformed(&deferred, "stream ended");
        }

        self.finished = true;
        events.push(FrameEvent::Terminal);
        events
    }

    /// Take the first complete line off the buffer, without its line ending.
    fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.find('\n')?;
        let mut line: String = self.buffer.drain(..=end).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }

        Some(line)
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<FrameEvent>) -> ControlFlow<()> {
        let data = line.strip_prefix(DATA_PREFIX);

        if let Some(mut deferred) = self.deferred.take() {
            match data {
                // A continuation line of a frame cut at a literal newline.
                None if !is_separator(line) => {
                    deferred.payload.push('\n');
                    deferred.payload.push_str(line);
                    deferred.continuations += 1;

                    match parse_payload(&deferred.payload) {
                        Ok(delta) => events.extend(delta.map(FrameEvent::Delta)),
                        Err(_) if deferred.continuations >= self.max_continuations => {
                            self.drop_malformed(&deferred, "too many continuation lines");
                        }
                        Err(_) => self.deferred = Some(deferred),
                    }

                    return ControlFlow::Continue(());
                }

                // JSON may break before a `:`, so try the join before
                // treating the line as a comment.
                None if line.starts_with(COMMENT_PREFIX) => {
                    let joined = format!("{}\n{line}", deferred.payload);
                    if let Ok(delta) = parse_payload(&joined) {
                        events.extend(delta.map(FrameEvent::Delta));
                        return ControlFlow::Continue(());
                    }

                    self.drop_malformed(&deferred, "superseded by a comment");
                }

                // Multi-line `data:` fields belong to the same frame.
                Some(payload) => {
                    let joined = format!("{}\n{}", deferred.payload, payload.trim());
                    if let Ok(delta) = parse_payload(&joined) {
                        events.extend(delta.map(FrameEvent::Delta));
                        return ControlFlow::Continue(());
                    }

                    self.drop_malformed(&deferred, "superseded by a new frame");
                }

                None => self.drop_malformed(&deferred, "superseded by a new frame"),
            }
        }

        if is_separator(line) {
            return ControlFlow::Continue(());
        }

        let Some(payload) = data else {
            trace!(line, "Skipping non-data line.");
            return ControlFlow::Continue(());
        };

        let payload = payload.trim();
        if payload == TERMINAL_SENTINEL {
            self.finished = true;
            self.buffer.clear();
            events.push(FrameEvent::Terminal);
            return ControlFlow::Break(());
        }

        match parse_payload(payload) {
            Ok(delta) => events.extend(delta.map(FrameEvent::Delta)),
            Err(error) => {
                trace!(%error, "Deferring incomplete data frame.");
                self.deferred = Some(Deferred {
                    payload: payload.to_owned(),
                    continuations: 0,
                });
            }
        }

        ControlFlow::Continue(())
    }

    fn drop_malformed(&mut self, deferred: &Deferred, reason: &str) {
        self.dropped += 1;
        warn!(
            reason,
            continuations = deferred.continuations,
            bytes = deferred.payload.len(),
            "Dropping malformed data frame."
        );
    }
}

/// Blank lines separate events, comment lines keep the connection alive.
fn is_separator(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(COMMENT_PREFIX)
}

/// A streamed chat completion chunk. Only the fields we read are modelled.
#[derive(Debug, Deserialize)]
struct Chunk {
    #[serde(default)]
    choices: Option<Vec<Choice>>,

    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Parse a data payload, returning the non-empty text at
/// `choices[0].delta.content`, if any.
fn parse_payload(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let chunk: Chunk = serde_json::from_str(payload)?;

    if let Some(error) = chunk.error {
        warn!(%error, "Upstream reported an error mid-stream.");
    }

    Ok(chunk
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.delta)
        .and_then(|delta| delta.content)
        .filter(|content| !content.is_empty()))
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
