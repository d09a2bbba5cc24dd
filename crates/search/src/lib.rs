//! Web search adapters for inkloop.
//!
//! All adapters implement `inkloop_core::SearchClient`.

pub mod tavily;

pub use tavily::TavilyClient;

use std::time::Duration;

use inkloop_config::AppConfig;
use inkloop_core::error::SearchError;

/// Build the configured search client.
pub fn build_from_config(config: &AppConfig) -> Result<TavilyClient, SearchError> {
    let api_key = config.search.api_key.clone().ok_or_else(|| {
        SearchError::AuthenticationFailed("no search API key configured (set TAVILY_API_KEY)".into())
    })?;
    TavilyClient::new(
        &config.search.api_url,
        api_key,
        Duration::from_secs(config.request_timeout_secs),
    )
}
