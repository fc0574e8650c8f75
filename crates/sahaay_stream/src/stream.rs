use std::{fmt::Display, pin::Pin};

use async_stream::stream;
use futures::{Stream, StreamExt as _};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    error::StreamError,
    frame::{FrameEvent, FrameParser},
};

/// A lazily evaluated stream of [`FrameEvent`]s.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<FrameEvent, StreamError>> + Send>>;

/// Turn a stream of byte chunks into a stream of [`FrameEvent`]s.
///
/// The stream ends after the first [`FrameEvent::Terminal`], or after the
/// first transport error. Cancelling the token closes the byte source and ends
/// the stream with a terminal event; the text received until then stays valid.
pub fn event_stream<S, B, E>(bytes: S, mut parser: FrameParser, cancel: CancellationToken) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(stream! {
        let mut bytes = Box::pin(bytes);

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                next = bytes.next() => Some(next),
            };

            let Some(next) = next else {
                debug!("Stream cancelled by caller.");
                drop(bytes);
                yield Ok(FrameEvent::Terminal);
                return;
            };

            match next {
                Some(Ok(chunk)) => {
                    trace!(bytes = chunk.as_ref().len(), "Received chunk.");
                    for event in parser.feed(chunk.as_ref()) {
                        let terminal = event.is_terminal();
                        yield Ok(event);
                        if terminal {
                            return;
                        }
                    }
                }
                Some(Err(error)) => {
                    warn!(%error, "Connection lost mid-stream.");
                    yield Err(StreamError::Transport(error.to_string()));
                    return;
                }
                None => break,
            }
        }

        for event in parser.flush() {
            yield Ok(event);
        }
    })
}
