use std::collections::HashMap;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use sahaay_wire::RelayRequest;
use serde::Serialize;
use tracing::{error, trace};

use crate::{
    error::{Error, Result},
    policy,
};

pub const DEFAULT_UPSTREAM_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

/// The upstream chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct Upstream {
    api_key: Option<String>,
    model: String,
    url: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletion<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

impl Upstream {
    /// Without an `api_key` every request fails with [`Error::ConfigMissing`].
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_owned(),
            url: DEFAULT_UPSTREAM_URL.to_owned(),
            http_client: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            format!("Bearer {api_key}")
                .parse()
                .map_err(|e| Error::Config(format!("Invalid API key header format: {e}")))?,
        );

        Ok(headers)
    }

    /// Open a streaming completion for `request`.
    ///
    /// Returns the upstream response once its status is known to be a
    /// success. The body is left unread.
    pub async fn chat_completion_stream(&self, request: &RelayRequest) -> Result<reqwest::Response> {
        let api_key = self.api_key.as_deref().ok_or(Error::ConfigMissing)?;
        let headers = self.build_headers(api_key)?;

        let system = policy::system_prompt(request.language);
        let messages = std::iter::once(Message {
            role: "system",
            content: &system,
        })
        .chain(request.turns.iter().map(|turn| Message {
            role: turn.role.as_str(),
            content: &turn.content,
        }))
        .collect();

        let body = ChatCompletion {
            model: &self.model,
            messages,
            stream: true,
        };

        let redacted_headers = headers
            .iter()
            .map(|(k, v)| {
                if *k == AUTHORIZATION {
                    return (k.to_owned(), "[REDACTED]".to_owned());
                }

                (k.to_owned(), v.to_str().unwrap_or_default().to_owned())
            })
            .collect::<HashMap<_, _>>();

        trace!(url = %self.url, headers = ?redacted_headers, "Triggering request.");
        let response = self
            .http_client
            .post(&self.url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        trace!(
            status = response.status().as_u16(),
            content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .map(|v| v.to_str().unwrap_or_default()),
            "Received response."
        );

        let status = response.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = response.text().await.unwrap_or_default();

            error!(status = code, body, "Unexpected upstream response.");
            return Err(Error::Upstream { code, body });
        }

        Ok(response)
    }
}
