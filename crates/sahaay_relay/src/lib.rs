//! The streaming inference relay.
//!
//! A stateless HTTP service that wraps a conversation in the safety policy,
//! forwards it to the upstream chat-completion endpoint and passes the
//! upstream event stream back to the caller byte for byte. Upstream failures
//! are normalized into [`sahaay_wire::FailureKind`] before they cross the
//! HTTP boundary.

mod error;
pub mod policy;
mod server;
mod upstream;

pub use error::{Error, Result};
pub use server::{AppState, CORS_HEADERS, router, serve};
pub use upstream::{DEFAULT_MODEL, DEFAULT_UPSTREAM_URL, Upstream};
