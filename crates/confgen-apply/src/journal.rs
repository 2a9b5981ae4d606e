//! Durable session journal
//!
//! Closed sessions are written to the journal so rollback remains possible
//! after a process restart. The file journal appends one JSON record per
//! session (JSONL).

use crate::session::{ApplyOperation, ApplySession};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Journal errors
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Journal file I/O failed
    #[error("journal io: {0}")]
    Io(#[from] std::io::Error),

    /// A journal record could not be decoded
    #[error("journal record corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable log of apply sessions
#[async_trait]
pub trait SessionJournal: Send + Sync {
    /// Append a session record
    async fn record(&self, session: &ApplySession) -> Result<(), JournalError>;

    /// Load the most recent record for an execution id
    async fn load(&self, execution_id: &str) -> Result<Option<ApplySession>, JournalError>;

    /// Recorded operations, newest session first, paged
    async fn history(&self, limit: usize, offset: usize)
        -> Result<Vec<ApplyOperation>, JournalError>;
}

/// In-memory journal, for tests and ephemeral deployments
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    sessions: tokio::sync::Mutex<Vec<ApplySession>>,
}

impl InMemoryJournal {
    /// Create an empty journal
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionJournal for InMemoryJournal {
    async fn record(&self, session: &ApplySession) -> Result<(), JournalError> {
        self.sessions.lock().await.push(session.clone());
        Ok(())
    }

    async fn load(&self, execution_id: &str) -> Result<Option<ApplySession>, JournalError> {
        Ok(self
            .sessions
            .lock()
            .await
            .iter()
            .rev()
            .find(|s| s.execution_id == execution_id)
            .cloned())
    }

    async fn history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ApplyOperation>, JournalError> {
        let sessions = self.sessions.lock().await;
        Ok(page_operations(sessions.iter(), limit, offset))
    }
}

/// Append-only JSONL file journal
#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
}

impl FileJournal {
    /// Create a journal at a path; the file is created on first record
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_sessions(&self) -> Result<Vec<ApplySession>, JournalError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(JournalError::from))
            .collect()
    }
}

#[async_trait]
impl SessionJournal for FileJournal {
    async fn record(&self, session: &ApplySession) -> Result<(), JournalError> {
        let mut line = serde_json::to_string(session)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        tracing::debug!(execution_id = %session.execution_id, "session journaled");
        Ok(())
    }

    async fn load(&self, execution_id: &str) -> Result<Option<ApplySession>, JournalError> {
        Ok(self
            .read_sessions()
            .await?
            .into_iter()
            .rev()
            .find(|s| s.execution_id == execution_id))
    }

    async fn history(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ApplyOperation>, JournalError> {
        let sessions = self.read_sessions().await?;
        Ok(page_operations(sessions.iter(), limit, offset))
    }
}

/// Newest-session-first operation paging shared by both journals
fn page_operations<'a>(
    sessions: impl DoubleEndedIterator<Item = &'a ApplySession>,
    limit: usize,
    offset: usize,
) -> Vec<ApplyOperation> {
    sessions
        .rev()
        .flat_map(|s| s.operations.iter())
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}
