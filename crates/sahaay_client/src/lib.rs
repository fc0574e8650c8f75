//! An HTTP client for the relay's `POST /chat` endpoint.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use sahaay_conversation::{Relay, Session};
use sahaay_stream::{DEFAULT_MAX_CONTINUATIONS, EventStream, FrameParser, event_stream};
use sahaay_wire::{ErrorBody, Failure, FailureKind, RelayRequest, Turn};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

/// A [`Relay`] reached over HTTP.
#[derive(Debug, Clone)]
pub struct RelayClient {
    url: String,
    api_key: Option<String>,
    max_continuations: usize,
    http_client: reqwest::Client,
}

impl RelayClient {
    /// `url` is the full address of the chat endpoint.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            max_continuations: DEFAULT_MAX_CONTINUATIONS,
            http_client: reqwest::Client::new(),
        }
    }

    /// Present `api_key` as a bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.is_empty());
        self
    }

    #[must_use]
    pub fn with_max_continuations(mut self, max_continuations: usize) -> Self {
        self.max_continuations = max_continuations;
        self
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Relay for RelayClient {
    async fn open(
        &self,
        session: &Session,
        window: &[Turn],
        cancel: CancellationToken,
    ) -> Result<EventStream, Failure> {
        let request = RelayRequest::new(window.to_vec(), session.language);

        let mut builder = self.http_client.post(&self.url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        trace!(
            url = %self.url,
            session = %session.id,
            turns = window.len(),
            language = %session.language,
            "Triggering request."
        );

        let response = builder
            .send()
            .await
            .map_err(|error| Failure::transport(error.to_string()))?;

        let status = response.status();
        trace!(
            status = status.as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap_or_default()),
            "Received response."
        );

        if !status.is_success() {
            let kind = FailureKind::from_status(status.as_u16());
            let detail = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };

            warn!(status = status.as_u16(), %kind, detail, "Relay rejected the request.");
            return Err(Failure::new(kind, detail));
        }

        let parser = FrameParser::new().with_max_continuations(self.max_continuations);
        Ok(event_stream(response.bytes_stream(), parser, cancel))
    }
}
