//! Model provider implementations for inkloop.
//!
//! All providers implement the `inkloop_core::Provider` trait.
//! The router selects the configured provider.

mod http;

pub mod anthropic;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
