//! # inkloop core
//!
//! Domain types, traits, and error definitions shared by every inkloop crate.
//!
//! Each external collaborator (model API, search API, checkpoint storage) is
//! a trait here; implementations live in their own crates so the loops can
//! be tested against scripted stand-ins.

pub mod checkpoint;
pub mod error;
pub mod message;
pub mod provider;
pub mod search;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use checkpoint::{CheckpointStore, ThreadId};
pub use error::{Error, Result};
pub use message::{Message, MessageToolCall, Role, Transcript};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use search::{SearchClient, SearchHit, SearchRequest, SearchResponse};
pub use tool::{ActionRequest, ToolCall, BAD_TOOL_NAME};
