use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::{Error, Result, SessionId, TurnRecord};

/// Where finalized turns are persisted.
#[async_trait]
pub trait TurnStore: fmt::Debug + Send + Sync {
    async fn insert(&self, record: TurnRecord) -> Result<()>;

    /// All records of `session`, in insertion order.
    async fn list(&self, session: SessionId) -> Result<Vec<TurnRecord>>;
}

/// A [`TurnStore`] that keeps records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<TurnRecord>>,
    fail_inserts: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every insert.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    /// A copy of every record, across sessions.
    #[must_use]
    pub fn records(&self) -> Vec<TurnRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl TurnStore for MemoryStore {
    async fn insert(&self, record: TurnRecord) -> Result<()> {
        if self.fail_inserts {
            return Err(Error::Store("store is read-only".into()));
        }

        self.records.lock().push(record);
        Ok(())
    }

    async fn list(&self, session: SessionId) -> Result<Vec<TurnRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|record| record.session == session)
            .cloned()
            .collect())
    }
}
