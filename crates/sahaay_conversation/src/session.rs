use chrono::{DateTime, Utc};
use sahaay_wire::{Language, Turn};
use serde::{Deserialize, Serialize};

use crate::SessionId;

/// The context a conversation runs in.
///
/// Passed explicitly to every relay call and persisted with every turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub language: Language,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId, language: Language) -> Self {
        Self { id, language }
    }
}

/// A finalized turn as handed to a [`crate::TurnStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub session: SessionId,
    pub created_at: DateTime<Utc>,
    pub language: Language,
    pub turn: Turn,
}

impl TurnRecord {
    #[must_use]
    pub fn new(session: &Session, turn: Turn) -> Self {
        Self {
            session: session.id,
            created_at: Utc::now(),
            language: session.language,
            turn,
        }
    }
}
