use std::{future::Future, sync::Arc};

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{
        HeaderMap, HeaderName, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, AUTHORIZATION,
            CACHE_CONTROL, CONTENT_TYPE,
        },
    },
    response::{IntoResponse, Response},
    routing::post,
};
use sahaay_wire::RelayRequest;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    upstream::Upstream,
};

/// Headers carried by every relay response.
pub const CORS_HEADERS: [(HeaderName, &str); 2] = [
    (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
];

/// State shared by all requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    upstream: Upstream,

    /// When set, callers must present it as a bearer token.
    client_key: Option<Arc<str>>,
}

impl AppState {
    #[must_use]
    pub fn new(upstream: Upstream) -> Self {
        Self {
            upstream,
            client_key: None,
        }
    }

    #[must_use]
    pub fn with_client_key(mut self, client_key: Option<String>) -> Self {
        self.client_key = client_key
            .filter(|key| !key.is_empty())
            .map(Into::into);
        self
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = self.client_key.as_deref() else {
            return Ok(());
        };

        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match presented {
            Some(key) if key == expected => Ok(()),
            _ => Err(Error::Unauthorized),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat).options(preflight))
        .with_state(state)
}

/// Serve the relay on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if !state.upstream.is_configured() {
        info!("No upstream credential configured, every chat request will fail.");
    }

    info!(addr = ?listener.local_addr()?, "Relay listening.");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, CORS_HEADERS)
}

async fn chat(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Response> {
    state.authorize(&headers)?;

    let request: RelayRequest = serde_json::from_slice(&body)?;
    info!(
        turns = request.turns.len(),
        language = %request.language,
        "Relaying chat request."
    );

    if let Some(turn) = request.last_user_turn() {
        let keywords = sahaay_emergency::matches(&turn.content);
        if !keywords.is_empty() {
            info!(?keywords, "Latest user turn mentions an emergency.");
        }
    }

    let upstream = state.upstream.chat_completion_stream(&request).await?;
    debug!("Passing upstream stream through.");

    Ok((
        StatusCode::OK,
        CORS_HEADERS,
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response())
}
