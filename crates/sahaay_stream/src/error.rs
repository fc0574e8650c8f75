use sahaay_wire::Failure;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("connection lost mid-stream: {0}")]
    Transport(String),
}

impl From<StreamError> for Failure {
    fn from(error: StreamError) -> Self {
        match error {
            StreamError::Transport(detail) => Self::transport(detail),
        }
    }
}
