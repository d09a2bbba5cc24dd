//! Provider router: selects the model provider based on config.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use inkloop_config::AppConfig;
use inkloop_core::error::ProviderError;
use inkloop_core::provider::Provider;

use crate::anthropic::AnthropicProvider;
use crate::openai_compat::OpenAiCompatProvider;

/// Named providers plus the one used when nothing else is asked for.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }
}

/// Build providers from configuration.
///
/// Every `[providers.<name>]` table becomes a provider; the default provider
/// is always registered, even when it has no table of its own.
pub fn build_from_config(config: &AppConfig) -> Result<ProviderRouter, ProviderError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let api_key = provider_config
            .api_key
            .clone()
            .or_else(|| config.api_key.clone())
            .unwrap_or_default();
        let provider = build_one(name, provider_config.api_url.as_deref(), &api_key, timeout)?;
        router.register(name.clone(), provider);
    }

    if !router.providers.contains_key(&config.default_provider) {
        let api_key = config.api_key.clone().unwrap_or_default();
        let provider = build_one(&config.default_provider, None, &api_key, timeout)?;
        router.register(config.default_provider.clone(), provider);
    }

    Ok(router)
}

fn build_one(
    name: &str,
    api_url: Option<&str>,
    api_key: &str,
    timeout: Duration,
) -> Result<Arc<dyn Provider>, ProviderError> {
    if name == "anthropic" {
        let mut p = AnthropicProvider::new(api_key, timeout)?;
        if let Some(url) = api_url {
            p = p.with_base_url(url);
        }
        return Ok(Arc::new(p));
    }

    let base_url = api_url
        .map(str::to_string)
        .or_else(|| default_base_url(name))
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "provider '{name}' has no api_url and no well-known endpoint"
            ))
        })?;
    Ok(Arc::new(OpenAiCompatProvider::new(
        name, base_url, api_key, timeout,
    )?))
}

/// Base URL for well-known OpenAI-compatible providers.
fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1",
        "openai" => "https://api.openai.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        _ => return None,
    };
    Some(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkloop_config::ProviderConfig;

    #[test]
    fn build_from_default_config() {
        let config = AppConfig::default();
        let router = build_from_config(&config).unwrap();
        assert_eq!(router.default().unwrap().name(), "openrouter");
    }

    #[test]
    fn anthropic_default_uses_native_provider() {
        let config = AppConfig {
            default_provider: "anthropic".into(),
            ..AppConfig::default()
        };
        let router = build_from_config(&config).unwrap();
        assert_eq!(router.default().unwrap().name(), "anthropic");
    }

    #[test]
    fn configured_tables_are_registered() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "local".into(),
            ProviderConfig {
                api_url: Some("http://127.0.0.1:9000/v1".into()),
                ..ProviderConfig::default()
            },
        );
        let router = build_from_config(&config).unwrap();
        let mut names: Vec<&str> = router.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["local", "openrouter"]);
    }

    #[test]
    fn unknown_provider_without_url_is_rejected() {
        let config = AppConfig {
            default_provider: "mystery".into(),
            ..AppConfig::default()
        };
        assert!(matches!(
            build_from_config(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn well_known_urls() {
        assert!(default_base_url("openrouter").unwrap().contains("openrouter.ai"));
        assert!(default_base_url("ollama").unwrap().contains("11434"));
        assert!(default_base_url("nope").is_none());
    }
}
