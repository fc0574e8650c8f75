use std::fmt;

use async_trait::async_trait;
use sahaay_stream::EventStream;
use sahaay_wire::{Failure, Turn};
use tokio_util::sync::CancellationToken;

use crate::Session;

/// Opens a streamed assistant response for a conversation window.
#[async_trait]
pub trait Relay: fmt::Debug + Send + Sync {
    /// Send `window` and return the response's event stream.
    ///
    /// Fails before any event is produced when the relay rejects the request.
    /// `cancel` ends the returned stream early with a terminal event.
    async fn open(
        &self,
        session: &Session,
        window: &[Turn],
        cancel: CancellationToken,
    ) -> Result<EventStream, Failure>;
}
