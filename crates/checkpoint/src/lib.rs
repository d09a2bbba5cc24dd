//! Checkpoint stores: where resumable runs keep their state between steps.
//!
//! Two backends:
//! - `in_memory`: per-process map, the default
//! - `file`: one pretty-printed JSON document per thread

pub mod file;
pub mod in_memory;

use std::sync::Arc;

use inkloop_config::{AppConfig, CheckpointBackend};
use inkloop_core::checkpoint::CheckpointStore;

pub use file::FileCheckpointStore;
pub use in_memory::InMemoryCheckpointStore;

/// Build the store selected by `[checkpoint]` in the config.
pub fn build_from_config(config: &AppConfig) -> Arc<dyn CheckpointStore> {
    match config.checkpoint.backend {
        CheckpointBackend::Memory => Arc::new(InMemoryCheckpointStore::new()),
        CheckpointBackend::File => {
            Arc::new(FileCheckpointStore::new(config.checkpoint.resolved_dir()))
        }
    }
}
