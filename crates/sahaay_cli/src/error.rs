use std::io;

use crate::cmd;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// CLI Error types
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("{0}")]
    Command(#[from] cmd::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] sahaay_config::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] sahaay_storage::Error),

    #[error("Conversation error: {0}")]
    Conversation(#[from] sahaay_conversation::Error),

    #[error("Relay error: {0}")]
    Relay(#[from] sahaay_relay::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
