//! Error types for the inkloop domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each external collaborator gets its own error enum so a run can report
//! exactly which boundary failed.

use thiserror::Error;

/// The top-level error type for all inkloop operations.
///
/// Every variant is fatal for the run that produced it. Recoverable tool
/// failures never reach this type: the loops turn them into observations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Model client errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Search client errors ---
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    // --- Structured output errors ---
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    // --- Persistence errors ---
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Search API key rejected: {0}")]
    AuthenticationFailed(String),

    #[error("Search request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed search response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("{action} failed: {reason}")]
    ExecutionFailed { action: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

/// Failure to coerce model output into a structured value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("no JSON object found in model output")]
    MissingObject,

    #[error("invalid JSON object in model output: {0}")]
    InvalidJson(String),

    #[error("structured output rejected: {0}")]
    Schema(String),
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint storage error: {0}")]
    Storage(String),

    #[error("Corrupted checkpoint for thread {thread_id}: {reason}")]
    Corrupted { thread_id: String, reason: String },
}
