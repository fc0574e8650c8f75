use crate::GenerationId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid ID: {0}")]
    Id(#[from] uuid::Error),

    #[error("Turn store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Assistant turn of generation {0} is still open")]
    TurnOpen(GenerationId),

    #[error("No user turn to answer")]
    NoUserTurn,

    #[error("Generation {got} is not the open generation")]
    StaleGeneration { got: GenerationId },
}

#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }

        // Good enough for testing purposes
        format!("{self:?}") == format!("{other:?}")
    }
}
