//! In-memory checkpoint store: useful for testing and one-shot runs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use inkloop_core::checkpoint::{CheckpointStore, ThreadId};
use inkloop_core::error::CheckpointError;
use tokio::sync::RwLock;

/// Keeps the latest state per thread in a map. Lost when the process exits.
pub struct InMemoryCheckpointStore {
    threads: Arc<RwLock<HashMap<ThreadId, serde_json::Value>>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self {
            threads: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.threads.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.threads.read().await.is_empty()
    }
}

impl Default for InMemoryCheckpointStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn load(&self, thread: &ThreadId) -> Result<Option<serde_json::Value>, CheckpointError> {
        Ok(self.threads.read().await.get(thread).cloned())
    }

    async fn save(&self, thread: &ThreadId, state: serde_json::Value) -> Result<(), CheckpointError> {
        self.threads.write().await.insert(thread.clone(), state);
        Ok(())
    }

    async fn delete(&self, thread: &ThreadId) -> Result<bool, CheckpointError> {
        Ok(self.threads.write().await.remove(thread).is_some())
    }
}
