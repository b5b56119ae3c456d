//! Submission store: the append-only source of engine snapshots.
//!
//! The file-backed store keeps every submission in one pretty-printed JSON
//! array. Appends rewrite the file atomically; callers are expected to
//! serialize writers (the gateway holds the store behind a mutex).

use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::persistence::{atomic_write_json, load_json};
use crate::types::Submission;

/// Read/append access to the full submission set.
pub trait SubmissionStore: Send + Sync {
    /// Every stored submission, in insertion order.
    fn load_all(&self) -> Result<Vec<Submission>, StoreError>;

    /// Append one already-validated submission.
    fn append(&mut self, submission: Submission) -> Result<(), StoreError>;

    /// Like [`SubmissionStore::load_all`], but a failed read is logged and
    /// served as an empty snapshot.
    fn snapshot(&self) -> Vec<Submission> {
        match self.load_all() {
            Ok(submissions) => submissions,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load submissions, using empty snapshot");
                Vec::new()
            }
        }
    }
}

/// Submissions persisted as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SubmissionStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<Submission>, StoreError> {
        match load_json::<Vec<Submission>>(&self.path) {
            Ok(Some(submissions)) => {
                tracing::debug!(
                    path = %self.path.display(),
                    count = submissions.len(),
                    "Loaded submissions"
                );
                Ok(submissions)
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "Store file missing, starting empty");
                Ok(Vec::new())
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Err(StoreError::Corrupt {
                path: self.path.clone(),
                message: e.to_string(),
            }),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn append(&mut self, submission: Submission) -> Result<(), StoreError> {
        // A corrupt file fails here instead of being overwritten.
        let mut submissions = self.load_all()?;
        let id = submission.id.clone();
        submissions.push(submission);
        atomic_write_json(&self.path, &submissions).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        tracing::info!(
            id = %id,
            total = submissions.len(),
            path = %self.path.display(),
            "Stored submission"
        );
        Ok(())
    }
}

/// In-process store, used by tests and embedders that manage their own
/// persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    submissions: Vec<Submission>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submissions(submissions: Vec<Submission>) -> Self {
        Self { submissions }
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

impl SubmissionStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Submission>, StoreError> {
        Ok(self.submissions.clone())
    }

    fn append(&mut self, submission: Submission) -> Result<(), StoreError> {
        self.submissions.push(submission);
        Ok(())
    }
}
