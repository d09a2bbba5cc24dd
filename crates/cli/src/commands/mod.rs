//! Subcommand handlers and the wiring they share.

pub mod ask;
pub mod config_cmd;
pub mod essay;
pub mod replay;
pub mod research;
pub mod search;

use std::sync::Arc;

use inkloop_config::AppConfig;
use inkloop_core::provider::Provider;
use inkloop_core::search::SearchClient;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The default provider and the model to ask it for.
pub fn model_provider(
    config: &AppConfig,
) -> Result<(Arc<dyn Provider>, String), Box<dyn std::error::Error>> {
    // Fail early with setup instructions
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No model API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY=sk-or-v1-...   (recommended)");
        eprintln!("    ANTHROPIC_API_KEY=sk-ant-...      (with INKLOOP_PROVIDER=anthropic)");
        eprintln!("    OPENAI_API_KEY=sk-...             (with INKLOOP_PROVIDER=openai)");
        eprintln!("    INKLOOP_API_KEY=...               (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = inkloop_providers::build_from_config(config)?;
    let provider = router.default().ok_or("No default provider configured")?;
    let model = config
        .providers
        .get(&config.default_provider)
        .and_then(|p| p.default_model.clone())
        .unwrap_or_else(|| config.default_model.clone());
    Ok((provider, model))
}

pub fn search_client(config: &AppConfig) -> Result<Arc<dyn SearchClient>, Box<dyn std::error::Error>> {
    Ok(Arc::new(inkloop_search::build_from_config(config)?))
}
