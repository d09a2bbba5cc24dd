//! File checkpoint store: one JSON document per thread.
//!
//! Storage location: `<dir>/<thread_id>.json` (default dir
//! `~/.inkloop/threads`). Each save rewrites the whole document through a
//! temporary file so a crash never leaves half a checkpoint behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use inkloop_core::checkpoint::{CheckpointStore, ThreadId};
use inkloop_core::error::CheckpointError;
use tracing::debug;

pub struct FileCheckpointStore {
    dir: PathBuf,
}

impl FileCheckpointStore {
    /// The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Thread ids become file names, so only a safe alphabet is accepted.
    fn path_for(&self, thread: &ThreadId) -> Result<PathBuf, CheckpointError> {
        let id = thread.as_str();
        let safe = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !safe {
            return Err(CheckpointError::Storage(format!(
                "thread id '{id}' cannot be used as a file name"
            )));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, thread: &ThreadId) -> Result<Option<serde_json::Value>, CheckpointError> {
        let path = self.path_for(thread)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CheckpointError::Storage(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let value = serde_json::from_str(&raw).map_err(|e| CheckpointError::Corrupted {
            thread_id: thread.to_string(),
            reason: e.to_string(),
        })?;
        debug!(thread = %thread, path = %path.display(), "Checkpoint loaded");
        Ok(Some(value))
    }

    async fn save(&self, thread: &ThreadId, state: serde_json::Value) -> Result<(), CheckpointError> {
        let path = self.path_for(thread)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            CheckpointError::Storage(format!("Failed to create checkpoint directory: {e}"))
        })?;

        let body = serde_json::to_string_pretty(&state)
            .map_err(|e| CheckpointError::Storage(format!("Failed to serialize state: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to write checkpoint: {e}")))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| CheckpointError::Storage(format!("Failed to replace checkpoint: {e}")))?;

        debug!(thread = %thread, path = %path.display(), "Checkpoint saved");
        Ok(())
    }

    async fn delete(&self, thread: &ThreadId) -> Result<bool, CheckpointError> {
        let path = self.path_for(thread)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CheckpointError::Storage(format!(
                "Failed to delete checkpoint: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let thread = ThreadId::from("essay-7");

        let store = FileCheckpointStore::new(dir.path());
        store
            .save(&thread, json!({"state": {"revision_number": 2}, "next": "reflect"}))
            .await
            .unwrap();

        let reopened = FileCheckpointStore::new(dir.path());
        let loaded = reopened.load(&thread).await.unwrap().unwrap();
        assert_eq!(loaded["next"], "reflect");
        assert!(dir.path().join("essay-7.json").exists());
        assert!(!dir.path().join("essay-7.json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_thread_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path().join("not-yet-created"));
        assert!(store.load(&ThreadId::from("nope")).await.unwrap().is_none());
        assert!(!store.delete(&ThreadId::from("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn corrupted_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let store = FileCheckpointStore::new(dir.path());

        let err = store.load(&ThreadId::from("bad")).await.unwrap_err();
        assert!(matches!(err, CheckpointError::Corrupted { .. }));
    }

    #[tokio::test]
    async fn path_like_thread_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        for id in ["../escape", "a/b", "", ".hidden"] {
            let err = store.save(&ThreadId::from(id), json!({})).await.unwrap_err();
            assert!(matches!(err, CheckpointError::Storage(_)), "{id:?} accepted");
        }
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        let thread = ThreadId::from("done");
        store.save(&thread, json!(1)).await.unwrap();
        assert!(store.delete(&thread).await.unwrap());
        assert!(store.load(&thread).await.unwrap().is_none());
    }
}
