//! Configuration loading, validation, and management for inkloop.
//!
//! Loads configuration from `~/.inkloop/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.inkloop/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the default provider (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default model provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Sampling temperature for every agent call
    #[serde(default)]
    pub temperature: f32,

    /// Max tokens per completion (unset = provider default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Timeout applied to every model and search HTTP call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub checkpoint: CheckpointConfig,
}

fn default_provider() -> String {
    "openrouter".into()
}
fn default_model() -> String {
    "anthropic/claude-3-haiku".into()
}
fn default_request_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("providers", &self.providers)
            .field("search", &self.search)
            .field("agent", &self.agent)
            .field("checkpoint", &self.checkpoint)
            .finish()
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Web search settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_search_url")]
    pub api_url: String,

    /// Results per query in the essay research steps
    #[serde(default = "default_research_results")]
    pub research_results: usize,

    /// Results per call of the `web_search` tool
    #[serde(default = "default_tool_results")]
    pub tool_results: usize,

    /// How many research queries may be in flight at once (1 = sequential)
    #[serde(default = "default_search_concurrency")]
    pub concurrency: usize,
}

fn default_search_url() -> String {
    "https://api.tavily.com".into()
}
fn default_research_results() -> usize {
    2
}
fn default_tool_results() -> usize {
    4
}
fn default_search_concurrency() -> usize {
    1
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_search_url(),
            research_results: default_research_results(),
            tool_results: default_tool_results(),
            concurrency: default_search_concurrency(),
        }
    }
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("research_results", &self.research_results)
            .field("tool_results", &self.tool_results)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

/// Hard ceiling on inference calls per tool-loop turn.
pub const MAX_ITERATIONS_LIMIT: u32 = 5;

/// Loop bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Inference calls allowed per tool-loop turn (1 to 5)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Default revision bound for essay runs
    #[serde(default = "default_max_revisions")]
    pub max_revisions: u32,
}

fn default_max_iterations() -> u32 {
    MAX_ITERATIONS_LIMIT
}
fn default_max_revisions() -> u32 {
    2
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_revisions: default_max_revisions(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointBackend {
    /// Lost when the process exits
    #[default]
    Memory,
    /// One JSON file per thread
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    #[serde(default)]
    pub backend: CheckpointBackend,

    /// Directory for the file backend (default: `~/.inkloop/threads`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            backend: CheckpointBackend::Memory,
            dir: None,
        }
    }
}

impl CheckpointConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("threads"))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.inkloop/config.toml).
    ///
    /// Also checks environment variables:
    /// - `INKLOOP_API_KEY` (highest priority), then `OPENROUTER_API_KEY`,
    ///   `ANTHROPIC_API_KEY`, `OPENAI_API_KEY`
    /// - `INKLOOP_PROVIDER`, `INKLOOP_MODEL`
    /// - `TAVILY_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = ["INKLOOP_API_KEY", "OPENROUTER_API_KEY", "ANTHROPIC_API_KEY", "OPENAI_API_KEY"]
                .iter()
                .find_map(|key| lookup(key));
        }

        if let Some(provider) = lookup("INKLOOP_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("INKLOOP_MODEL") {
            self.default_model = model;
        }

        if self.search.api_key.is_none() {
            self.search.api_key = lookup("TAVILY_API_KEY");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".inkloop")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if !(1..=MAX_ITERATIONS_LIMIT).contains(&self.agent.max_iterations) {
            return Err(ConfigError::ValidationError(format!(
                "agent.max_iterations must be between 1 and {MAX_ITERATIONS_LIMIT}"
            )));
        }

        if self.search.research_results == 0 || self.search.tool_results == 0 {
            return Err(ConfigError::ValidationError(
                "search result caps must be > 0".into(),
            ));
        }

        if self.search.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "search.concurrency must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
            || self
                .providers
                .get(&self.default_provider)
                .is_some_and(|p| p.api_key.is_some())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: 0.0,
            max_tokens: None,
            request_timeout_secs: default_request_timeout(),
            providers: HashMap::new(),
            search: SearchConfig::default(),
            agent: AgentConfig::default(),
            checkpoint: CheckpointConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
