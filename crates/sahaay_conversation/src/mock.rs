//! A scripted [`Relay`] for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::{StreamExt as _, stream};
use parking_lot::Mutex;
use sahaay_stream::{EventStream, FrameParser, event_stream};
use sahaay_wire::{Failure, FailureKind, Language, Turn};
use tokio_util::sync::CancellationToken;

use crate::{Relay, Session, SessionId};

/// What a [`MockRelay`] answers a single `open` call with.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these raw chunks.
    ///
    /// With `hang`, the byte stream stays open after the last chunk until the
    /// call is cancelled.
    Chunks { chunks: Vec<Vec<u8>>, hang: bool },

    /// Stream these chunks, then lose the connection.
    Broken { chunks: Vec<Vec<u8>>, error: String },

    /// Reject the request.
    Failure(Failure),
}

impl MockResponse {
    /// A well-formed stream carrying `deltas`, ending with the sentinel.
    #[must_use]
    pub fn deltas(deltas: &[&str]) -> Self {
        let mut body = String::new();
        for delta in deltas {
            body.push_str(&data_line(delta));
        }
        body.push_str("data: [DONE]\n\n");

        Self::Chunks {
            chunks: vec![body.into_bytes()],
            hang: false,
        }
    }

    /// `deltas` as separate chunks, with the connection left open afterwards.
    #[must_use]
    pub fn hanging(deltas: &[&str]) -> Self {
        Self::Chunks {
            chunks: deltas.iter().map(|d| data_line(d).into_bytes()).collect(),
            hang: true,
        }
    }

    #[must_use]
    pub fn broken(deltas: &[&str], error: impl Into<String>) -> Self {
        Self::Broken {
            chunks: deltas.iter().map(|d| data_line(d).into_bytes()).collect(),
            error: error.into(),
        }
    }

    #[must_use]
    pub fn failure(kind: FailureKind) -> Self {
        Self::Failure(Failure::new(kind, kind.relay_message()))
    }
}

fn data_line(content: &str) -> String {
    let chunk = serde_json::json!({ "choices": [{ "delta": { "content": content } }] });
    format!("data: {chunk}\n\n")
}

/// One recorded [`Relay::open`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub session: SessionId,
    pub language: Language,
    pub window: Vec<Turn>,
}

/// A [`Relay`] answering calls with queued [`MockResponse`]s, in order.
///
/// Calls beyond the queue fail as [`FailureKind::UpstreamUnavailable`].
#[derive(Debug, Default)]
pub struct MockRelay {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockRelay {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::default(),
        }
    }

    /// A relay answering one call with `deltas`.
    #[must_use]
    pub fn with_deltas(deltas: &[&str]) -> Self {
        Self::new([MockResponse::deltas(deltas)])
    }

    pub fn push(&self, response: MockResponse) {
        self.responses.lock().push_back(response);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Relay for MockRelay {
    async fn open(
        &self,
        session: &Session,
        window: &[Turn],
        cancel: CancellationToken,
    ) -> Result<EventStream, Failure> {
        self.calls.lock().push(MockCall {
            session: session.id,
            language: session.language,
            window: window.to_vec(),
        });

        let response = self.responses.lock().pop_front().ok_or_else(|| {
            Failure::new(FailureKind::UpstreamUnavailable, "no mock response queued")
        })?;

        let bytes = match response {
            MockResponse::Failure(failure) => return Err(failure),
            MockResponse::Chunks { chunks, hang } => {
                let chunks = stream::iter(chunks.into_iter().map(Ok::<_, String>));
                if hang {
                    chunks.chain(stream::pending()).boxed()
                } else {
                    chunks.boxed()
                }
            }
            MockResponse::Broken { chunks, error } => stream::iter(chunks.into_iter().map(Ok))
                .chain(stream::once(async move { Err(error) }))
                .boxed(),
        };

        Ok(event_stream(bytes, FrameParser::new(), cancel))
    }
}
