//! The error taxonomy shared by the relay and its clients.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every way a relayed request can fail.
///
/// The relay normalizes upstream failures into one of these before they cross
/// the HTTP boundary; clients map them back from the status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The relay has no upstream credential.
    ConfigMissing,

    /// Upstream asked us to slow down.
    RateLimited,

    /// Upstream usage quota is spent.
    QuotaExhausted,

    /// Any other upstream failure.
    UpstreamUnavailable,

    /// A data frame that never parsed. Never surfaced to the user.
    MalformedFrame,

    /// The connection dropped while the response was streaming.
    TransportFailure,
}

impl FailureKind {
    /// The HTTP status the relay answers with for this failure.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::RateLimited => 429,
            Self::QuotaExhausted => 402,
            Self::ConfigMissing
            | Self::UpstreamUnavailable
            | Self::MalformedFrame
            | Self::TransportFailure => 500,
        }
    }

    /// Classify a non-success HTTP status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            402 => Self::QuotaExhausted,
            _ => Self::UpstreamUnavailable,
        }
    }

    /// Whether the caller may try again without outside intervention.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::UpstreamUnavailable | Self::TransportFailure
        )
    }

    /// The short, non-blocking notice shown to the user.
    #[must_use]
    pub const fn notice(self) -> &'static str {
        match self {
            Self::RateLimited => "Rate limit reached. Please wait a moment.",
            Self::QuotaExhausted => "AI usage limit reached.",
            Self::ConfigMissing
            | Self::UpstreamUnavailable
            | Self::MalformedFrame
            | Self::TransportFailure => "Service temporarily unavailable. Please try again.",
        }
    }

    /// The message the relay puts in its `{"error": ...}` body.
    #[must_use]
    pub const fn relay_message(self) -> &'static str {
        match self {
            Self::ConfigMissing => "upstream credential is not configured",
            Self::RateLimited => "Rate limit exceeded. Please try again shortly.",
            Self::QuotaExhausted => "AI usage limit reached.",
            Self::UpstreamUnavailable | Self::MalformedFrame | Self::TransportFailure => {
                "AI service temporarily unavailable"
            }
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMissing => "CONFIG_MISSING",
            Self::RateLimited => "RATE_LIMITED",
            Self::QuotaExhausted => "QUOTA_EXHAUSTED",
            Self::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            Self::MalformedFrame => "MALFORMED_FRAME",
            Self::TransportFailure => "TRANSPORT_FAILURE",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure with the detail that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    #[must_use]
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::TransportFailure, detail)
    }

    /// The notice shown to the user for this failure.
    #[must_use]
    pub const fn notice(&self) -> &'static str {
        self.kind.notice()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail.is_empty() {
            return self.kind.fmt(f);
        }

        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl std::error::Error for Failure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_round_trips_for_relay_statuses() {
        assert_eq!(FailureKind::from_status(429), FailureKind::RateLimited);
        assert_eq!(FailureKind::from_status(402), FailureKind::QuotaExhausted);
        assert_eq!(FailureKind::from_status(503), FailureKind::UpstreamUnavailable);
        assert_eq!(FailureKind::from_status(400), FailureKind::UpstreamUnavailable);

        for kind in [FailureKind::RateLimited, FailureKind::QuotaExhausted] {
            assert_eq!(FailureKind::from_status(kind.status()), kind);
        }
        assert_eq!(FailureKind::ConfigMissing.status(), 500);
    }

    #[test]
    fn only_transient_failures_are_retryable() {
        assert!(FailureKind::RateLimited.is_retryable());
        assert!(FailureKind::UpstreamUnavailable.is_retryable());
        assert!(FailureKind::TransportFailure.is_retryable());

        assert!(!FailureKind::ConfigMissing.is_retryable());
        assert!(!FailureKind::QuotaExhausted.is_retryable());
    }

    #[test]
    fn transport_failure_reads_like_unavailable() {
        assert_eq!(
            FailureKind::TransportFailure.notice(),
            FailureKind::UpstreamUnavailable.notice()
        );
        assert_eq!(
            Failure::transport("reset by peer").to_string(),
            "TRANSPORT_FAILURE: reset by peer"
        );
    }
}
