//! File-backed persistence of conversation turns.
//!
//! Every session is one JSON-lines file under `<root>/sessions/`, one
//! [`TurnRecord`] per line, in insertion order.

pub mod error;

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
pub use error::Error;
use sahaay_conversation::{SessionId, TurnRecord, TurnStore};
use tokio::{fs, io::AsyncWriteExt as _, sync::Mutex};
use tracing::{trace, warn};

use crate::error::Result;

pub const DEFAULT_STORAGE_DIR: &str = ".sahaay";
pub const SESSIONS_DIR: &str = "sessions";
const RECORD_EXTENSION: &str = "jsonl";

#[derive(Debug)]
pub struct FileStore {
    root: Utf8PathBuf,

    /// Serializes appends so that concurrent inserts never interleave.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `root`, creating it if needed.
    pub async fn new(root: impl Into<Utf8PathBuf>) -> Result<Self> {
        let root: Utf8PathBuf = root.into();
        if root.exists() {
            if !root.is_dir() {
                return Err(Error::NotDir(root));
            }
        } else {
            fs::create_dir_all(&root).await?;
            trace!(path = %root, "Created storage directory.");
        }

        fs::create_dir_all(root.join(SESSIONS_DIR)).await?;

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn session_path(&self, session: SessionId) -> Utf8PathBuf {
        self.root
            .join(SESSIONS_DIR)
            .join(format!("{session}.{RECORD_EXTENSION}"))
    }

    /// Every session with at least one stored turn.
    pub async fn sessions(&self) -> Result<Vec<SessionId>> {
        let mut sessions = vec![];
        let mut entries = fs::read_dir(self.root.join(SESSIONS_DIR)).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(path) = Utf8Path::from_path(&path) else {
                continue;
            };

            if path.extension() != Some(RECORD_EXTENSION) {
                continue;
            }

            match path.file_stem().map(str::parse::<SessionId>) {
                Some(Ok(id)) => sessions.push(id),
                _ => trace!(%path, "Skipping unrecognized session file."),
            }
        }

        sessions.sort();
        Ok(sessions)
    }

    async fn append(&self, record: &TurnRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.session_path(record.session);
        let _guard = self.write_lock.lock().await;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        trace!(%path, role = %record.turn.role, "Appended turn.");
        Ok(())
    }

    async fn read(&self, session: SessionId) -> Result<Vec<TurnRecord>> {
        let path = self.session_path(session);
        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(error) => return Err(error.into()),
        };

        let mut records = vec![];
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(error) => warn!(%path, line = index + 1, %error, "Skipping corrupt record."),
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl TurnStore for FileStore {
    async fn insert(&self, record: TurnRecord) -> sahaay_conversation::Result<()> {
        Ok(self.append(&record).await?)
    }

    async fn list(&self, session: SessionId) -> sahaay_conversation::Result<Vec<TurnRecord>> {
        Ok(self.read(session).await?)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
