use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sahaay_wire::{ErrorBody, FailureKind};
use tracing::warn;

use crate::server::CORS_HEADERS;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("upstream credential is not configured")]
    ConfigMissing,

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream error (status {code}): {body}")]
    Upstream { code: u16, body: String },

    #[error("client config error: {0}")]
    Config(String),

    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("unauthorized")]
    Unauthorized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The failure class this error is reported as, if it is one.
    #[must_use]
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::ConfigMissing => Some(FailureKind::ConfigMissing),
            Self::Upstream { code, .. } => Some(FailureKind::from_status(*code)),
            Self::Request(_) | Self::Config(_) => Some(FailureKind::UpstreamUnavailable),
            Self::InvalidRequest(_) | Self::Unauthorized | Self::Io(_) => None,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match (self.kind(), &self) {
            (Some(kind), _) => (
                StatusCode::from_u16(kind.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                kind.relay_message().to_owned(),
            ),
            (None, Self::Unauthorized) => (StatusCode::UNAUTHORIZED, self.to_string()),
            (None, _) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        warn!(status = status.as_u16(), error = %self, "Rejecting chat request.");
        (status, CORS_HEADERS, Json(ErrorBody::new(message))).into_response()
    }
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        format!("{self:?}") == format!("{other:?}")
    }
}
