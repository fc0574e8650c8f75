//! Incremental decoding of the relay's line-delimited event stream.
//!
//! [`FrameParser`] is the synchronous core: feed it raw chunks as they arrive,
//! split at arbitrary byte boundaries, and it yields [`FrameEvent`]s in
//! arrival order. [`event_stream`] drives a parser from any byte stream and
//! exposes the result as a cancellable [`EventStream`].

mod decoder;
mod error;
mod frame;
mod stream;

pub use decoder::Utf8Decoder;
pub use error::StreamError;
pub use frame::{
    COMMENT_PREFIX, DATA_PREFIX, DEFAULT_MAX_CONTINUATIONS, FrameEvent, FrameParser,
    TERMINAL_SENTINEL,
};
pub use stream::{EventStream, event_stream};
