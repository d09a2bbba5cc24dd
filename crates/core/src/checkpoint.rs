//! Checkpoint store trait: persistence of run state keyed by thread.
//!
//! Stores deal in opaque JSON documents; the agent that owns the state
//! decides its shape. A store never shares state between threads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CheckpointError;

/// Identifier of a run that may span several invocations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait]
pub trait CheckpointStore: Send + Sync {
    fn name(&self) -> &str;

    /// Latest saved state for `thread`, if any.
    async fn load(&self, thread: &ThreadId) -> Result<Option<serde_json::Value>, CheckpointError>;

    /// Replace the saved state for `thread`.
    async fn save(&self, thread: &ThreadId, state: serde_json::Value) -> Result<(), CheckpointError>;

    /// Forget `thread`. Returns whether anything was stored.
    async fn delete(&self, thread: &ThreadId) -> Result<bool, CheckpointError>;
}
